use std::sync::Arc;

use log::info;
use rand::{thread_rng, Rng};

use crate::clouds::CloudSystem;
use crate::collision::CollisionSurface;
use crate::config::SceneConfig;
use crate::constants::{lightning, sim};
use crate::particles::{RainSystem, SnowSystem, SplashSystem, WindDustSystem};
use crate::weather::astronomy::SkyLighting;
use crate::weather::report::{is_thunderstorm, WeatherReport};
use crate::weather::signal::WeatherSignal;

/// The three temporal bands of the scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ZoneId {
    Past,
    Present,
    Future,
}

impl ZoneId {
    pub const ALL: [ZoneId; 3] = [ZoneId::Past, ZoneId::Present, ZoneId::Future];

    pub fn index(self) -> usize {
        match self {
            ZoneId::Past => 0,
            ZoneId::Present => 1,
            ZoneId::Future => 2,
        }
    }
}

/// All per-zone particle systems bundled together.
pub struct ZoneEffects {
    pub rain: RainSystem,
    pub snow: SnowSystem,
    pub clouds: CloudSystem,
    pub dust: WindDustSystem,
}

impl ZoneEffects {
    fn new(zone: crate::zone::Zone) -> Self {
        Self {
            rain: RainSystem::new(zone),
            snow: SnowSystem::new(zone),
            clouds: CloudSystem::new(zone),
            dust: WindDustSystem::new(zone),
        }
    }
}

/// Owns one instance of every per-zone system plus the shared splash pool,
/// decodes raw weather records into per-system signals, and drives the
/// whole simulation once per rendered frame.
///
/// Only the present zone's rain is wired to the collision surface and the
/// splash pool; past and future render decoratively and never collide.
pub struct WeatherEffectsCoordinator {
    zones: [ZoneEffects; 3],
    splashes: SplashSystem,
    surface: Option<Arc<dyn CollisionSurface>>,
    reports: [WeatherReport; 3],
    flash_intensity: f32,
    lightning_cooldown: f32,
}

impl WeatherEffectsCoordinator {
    pub fn new(config: &SceneConfig) -> Self {
        Self {
            zones: [
                ZoneEffects::new(config.zone(ZoneId::Past)),
                ZoneEffects::new(config.zone(ZoneId::Present)),
                ZoneEffects::new(config.zone(ZoneId::Future)),
            ],
            splashes: SplashSystem::new(config.splash_capacity),
            surface: None,
            reports: [WeatherReport::default(); 3],
            flash_intensity: 0.0,
            lightning_cooldown: 0.0,
        }
    }

    /// Attach the ground geometry rain in the present zone collides with.
    /// Without one, precipitation degrades gracefully to simple looping.
    pub fn set_collision_surface(&mut self, surface: Arc<dyn CollisionSurface>) {
        self.surface = Some(surface);
    }

    /// Latest raw record for a zone; consumed on the next `update`. The
    /// core never distinguishes live data from debug overrides.
    pub fn submit_report(&mut self, zone: ZoneId, report: WeatherReport) {
        self.reports[zone.index()] = report;
    }

    pub fn zone(&self, id: ZoneId) -> &ZoneEffects {
        &self.zones[id.index()]
    }

    pub fn splashes(&self) -> &SplashSystem {
        &self.splashes
    }

    /// Shared flash scalar the external lighting subsystem consumes.
    pub fn flash_intensity(&self) -> f32 {
        self.flash_intensity
    }

    /// Advance the whole simulation by one frame.
    pub fn update(&mut self, dt: f32, sky: &SkyLighting) {
        if !dt.is_finite() || dt <= 0.0 {
            return;
        }
        let dt = dt.min(sim::MAX_DELTA);

        let signals = [
            WeatherSignal::decode(&self.reports[0]),
            WeatherSignal::decode(&self.reports[1]),
            WeatherSignal::decode(&self.reports[2]),
        ];

        for (idx, effects) in self.zones.iter_mut().enumerate() {
            let signal = &signals[idx];
            if idx == ZoneId::Present.index() {
                effects.rain.update(
                    dt,
                    signal,
                    self.surface.as_deref(),
                    Some(&mut self.splashes),
                );
            } else {
                effects.rain.update(dt, signal, None, None);
            }
            effects.snow.update(dt, signal);
            effects.dust.update(dt, signal);
            effects.clouds.update(dt, signal, sky);
        }

        self.splashes.update(dt);
        self.update_lightning(dt, &signals);
    }

    fn update_lightning(&mut self, dt: f32, signals: &[WeatherSignal; 3]) {
        self.flash_intensity = (self.flash_intensity - dt * lightning::DECAY_PER_SEC).max(0.0);
        self.lightning_cooldown = (self.lightning_cooldown - dt).max(0.0);

        let stormy = signals.iter().any(|s| is_thunderstorm(s.weather_code));
        if !stormy || self.lightning_cooldown > 0.0 {
            return;
        }
        let mut rng = thread_rng();
        if rng.gen::<f32>() < dt * lightning::STRIKES_PER_SECOND {
            self.flash_intensity = rng.gen_range(lightning::FLASH_MIN..lightning::FLASH_MAX);
            self.lightning_cooldown = lightning::COOLDOWN;
            info!("lightning strike, flash {:.2}", self.flash_intensity);
        }
    }
}
