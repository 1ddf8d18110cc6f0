use log::debug;

use crate::constants::sim::{FADE_DURATION, INTENSITY_SMOOTHING};

/// Fade state machine shared by every particle system.
///
/// Deactivation is never abrupt: it is always expressed as a fade toward
/// zero opacity over the fixed duration. Buffers stay allocated; "inactive"
/// only means zero opacity and a reduced drawable sub-range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FadePhase {
    Inactive,
    FadingIn,
    Stable,
    FadingOut,
}

#[derive(Debug, Clone)]
pub struct FadeLifecycle {
    phase: FadePhase,
    current_opacity: f32,
    target_opacity: f32,
    /// Opacity units per second. Pinned when a nonzero target is set so a
    /// fade-out takes the same duration as the fade-in that preceded it.
    rate: f32,
    fade_duration: f32,
}

impl FadeLifecycle {
    pub fn new() -> Self {
        Self::with_duration(FADE_DURATION)
    }

    pub fn with_duration(fade_duration: f32) -> Self {
        Self {
            phase: FadePhase::Inactive,
            current_opacity: 0.0,
            target_opacity: 0.0,
            rate: 1.0 / fade_duration.max(f32::EPSILON),
            fade_duration: fade_duration.max(f32::EPSILON),
        }
    }

    pub fn phase(&self) -> FadePhase {
        self.phase
    }

    /// Current opacity, always in `[0, target]` while fading in and
    /// monotonically approaching the target.
    pub fn opacity(&self) -> f32 {
        self.current_opacity
    }

    pub fn target(&self) -> f32 {
        self.target_opacity
    }

    pub fn is_inactive(&self) -> bool {
        self.phase == FadePhase::Inactive
    }

    /// Ramp the current opacity toward `target` at the fixed rate
    /// `target / fade_duration`, clamped, never overshooting. A zero or
    /// negative delta leaves the state untouched.
    pub fn update(&mut self, dt: f32, target: f32) {
        if dt <= 0.0 || !dt.is_finite() {
            return;
        }
        let target = target.clamp(0.0, 1.0);
        if target > 0.0 {
            self.rate = target / self.fade_duration;
        }
        self.target_opacity = target;

        let before = self.phase;
        let step = self.rate * dt;
        if self.current_opacity < target {
            self.current_opacity = (self.current_opacity + step).min(target);
            self.phase = if self.current_opacity >= target {
                FadePhase::Stable
            } else {
                FadePhase::FadingIn
            };
        } else if self.current_opacity > target {
            self.current_opacity = (self.current_opacity - step).max(target);
            self.phase = if self.current_opacity > target {
                FadePhase::FadingOut
            } else if target <= 0.0 {
                FadePhase::Inactive
            } else {
                FadePhase::Stable
            };
        } else {
            self.phase = if target <= 0.0 {
                FadePhase::Inactive
            } else {
                FadePhase::Stable
            };
        }

        if self.phase != before {
            debug!("fade phase {:?} -> {:?}", before, self.phase);
        }
    }
}

impl Default for FadeLifecycle {
    fn default() -> Self {
        Self::new()
    }
}

/// Exponential smoother applied to raw intensities before they drive
/// particle counts and fade targets, so an abrupt discrete weather-code
/// change still reads as a smooth transition.
#[derive(Debug, Clone, Copy, Default)]
pub struct IntensitySmoother {
    value: f32,
}

impl IntensitySmoother {
    pub fn new() -> Self {
        Self { value: 0.0 }
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    /// Advance toward `raw` and return the smoothed value. Snaps once the
    /// residual falls below noise level so steady state is exact.
    pub fn advance(&mut self, raw: f32, dt: f32) -> f32 {
        if dt > 0.0 && dt.is_finite() {
            let t = (dt * INTENSITY_SMOOTHING).min(1.0);
            self.value += (raw - self.value) * t;
            if (raw - self.value).abs() < 1e-3 {
                self.value = raw;
            }
        }
        self.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1.0 / 60.0;

    #[test]
    fn test_fade_in_reaches_target_in_duration() {
        let mut fade = FadeLifecycle::with_duration(5.0);
        let mut elapsed = 0.0;
        while elapsed < 5.0 + DT {
            fade.update(DT, 1.0);
            elapsed += DT;
            assert!(fade.opacity() <= 1.0, "opacity never overshoots");
        }
        assert!((fade.opacity() - 1.0).abs() < 1e-4);
        assert_eq!(fade.phase(), FadePhase::Stable);
    }

    #[test]
    fn test_half_duration_is_half_opacity() {
        let mut fade = FadeLifecycle::with_duration(5.0);
        let mut elapsed = 0.0;
        while elapsed < 2.5 {
            fade.update(DT, 1.0);
            elapsed += DT;
        }
        let err = (fade.opacity() - 0.5).abs() / 0.5;
        assert!(err < 0.05, "opacity {} not ~50% of target", fade.opacity());
    }

    #[test]
    fn test_fade_out_takes_same_duration() {
        let mut fade = FadeLifecycle::with_duration(2.0);
        for _ in 0..200 {
            fade.update(DT, 1.0);
        }
        assert_eq!(fade.phase(), FadePhase::Stable);

        let mut elapsed = 0.0;
        while fade.opacity() > 0.0 {
            fade.update(DT, 0.0);
            elapsed += DT;
            assert!(elapsed < 2.5, "fade-out should finish within duration");
        }
        assert_eq!(fade.phase(), FadePhase::Inactive);
    }

    #[test]
    fn test_zero_delta_is_idempotent() {
        let mut fade = FadeLifecycle::new();
        for _ in 0..30 {
            fade.update(DT, 1.0);
        }
        let opacity = fade.opacity();
        let phase = fade.phase();
        for _ in 0..10 {
            fade.update(0.0, 1.0);
        }
        assert_eq!(fade.opacity(), opacity);
        assert_eq!(fade.phase(), phase);
    }

    #[test]
    fn test_smoother_approaches_and_snaps() {
        let mut smoother = IntensitySmoother::new();
        for _ in 0..600 {
            smoother.advance(5.0, DT);
        }
        assert_eq!(smoother.value(), 5.0);

        let before = smoother.value();
        smoother.advance(5.0, 0.0);
        assert_eq!(smoother.value(), before);
    }
}
