use glam::Vec3;
use rand::{thread_rng, Rng};

use crate::collision::{CollisionSurface, Ray};
use crate::constants::{rain, sim};
use crate::lifecycle::{FadeLifecycle, IntensitySmoother};
use crate::particles::buffer::StreakBuffer;
use crate::particles::splash::SplashSystem;
use crate::weather::WeatherSignal;
use crate::zone::Zone;

/// Falling rain rendered as head+tail streaks.
///
/// The buffer always updates in full; intensity only moves the drawable
/// sub-range, so ramping weather up never has to re-seed a cold buffer.
/// Only the present zone is given a collision surface and a splash pool;
/// decorative zones simply loop their particles.
pub struct RainSystem {
    zone: Zone,
    buffer: StreakBuffer,
    lifecycle: FadeLifecycle,
    intensity: IntensitySmoother,
    active_count: usize,
}

impl RainSystem {
    pub fn new(zone: Zone) -> Self {
        let mut buffer = StreakBuffer::new(rain::CAPACITY);
        let mut rng = thread_rng();
        for i in 0..buffer.capacity {
            spawn_row(&mut buffer, i, &zone, (0.0, 0.0), &mut rng);
            // Scatter through the whole column so the first visible frame
            // is already populated.
            buffer.head_y[i] = rng.gen_range(rain::FLOOR_Y..rain::SPAWN_TOP_MAX);
            buffer.tail_y[i] = buffer.head_y[i];
        }
        Self {
            zone,
            buffer,
            lifecycle: FadeLifecycle::new(),
            intensity: IntensitySmoother::new(),
            active_count: rain::MIN_VISIBLE,
        }
    }

    pub fn zone(&self) -> Zone {
        self.zone
    }

    pub fn buffer(&self) -> &StreakBuffer {
        &self.buffer
    }

    /// Drawable sub-range; rows past this still update but are not drawn.
    pub fn active_count(&self) -> usize {
        self.active_count
    }

    /// Render opacity, already scaled by the material ceiling.
    pub fn opacity(&self) -> f32 {
        self.lifecycle.opacity() * rain::MAX_OPACITY
    }

    pub fn lifecycle(&self) -> &FadeLifecycle {
        &self.lifecycle
    }

    pub fn update(
        &mut self,
        dt: f32,
        signal: &WeatherSignal,
        surface: Option<&dyn CollisionSurface>,
        mut splashes: Option<&mut SplashSystem>,
    ) {
        if dt <= 0.0 {
            return;
        }

        let intensity = self.intensity.advance(signal.rain_intensity, dt);
        let target = if intensity > sim::INTENSITY_EPSILON {
            1.0
        } else {
            0.0
        };
        self.lifecycle.update(dt, target);
        self.active_count = ((intensity * rain::PARTICLES_PER_INTENSITY) as usize)
            .clamp(rain::MIN_VISIBLE, rain::CAPACITY);

        let (wind_x, wind_z) = signal.wind_target(rain::WIND_SCALE);
        let blend = (dt * 60.0 * rain::WIND_BLEND_PER_FRAME).min(1.0);
        let footprint = surface.map(|s| s.footprint());
        let ceiling = surface.map(|s| s.max_height());

        let zone = self.zone;
        let b = &mut self.buffer;
        let mut rng = thread_rng();

        for i in 0..b.capacity {
            b.falling[i] = true;

            // Inertia: blend horizontal velocity toward the wind target.
            b.vel_x[i] += (wind_x - b.vel_x[i]) * blend;
            b.vel_z[i] += (wind_z - b.vel_z[i]) * blend;

            b.head_x[i] += b.vel_x[i] * dt;
            b.head_y[i] += b.vel_y[i] * dt;
            b.head_z[i] += b.vel_z[i] * dt;

            // Head and tail shift together so the streak stays continuous.
            let shift = zone.wrap_shift(b.head_x[i]);
            if shift != 0.0 {
                b.head_x[i] += shift;
                b.tail_x[i] += shift;
            }

            if let (Some(surface), Some((cx, cz, radius)), Some(top)) =
                (surface, footprint, ceiling)
            {
                if b.head_y[i] <= top + rain::HIT_BAND {
                    let dx = b.head_x[i] - cx;
                    let dz = b.head_z[i] - cz;
                    if dx * dx + dz * dz <= radius * radius {
                        if let Some(ground) = impact_height(surface, b.head_x[i], b.head_y[i], b.head_z[i]) {
                            if b.head_y[i] <= ground {
                                if let Some(pool) = splashes.as_deref_mut() {
                                    pool.spawn(Vec3::new(b.head_x[i], ground, b.head_z[i]));
                                }
                                spawn_row(b, i, &zone, (wind_x, wind_z), &mut rng);
                                b.falling[i] = false;
                                continue;
                            }
                        }
                    }
                }
            }

            if b.head_y[i] < rain::FLOOR_Y {
                spawn_row(b, i, &zone, (wind_x, wind_z), &mut rng);
                b.falling[i] = false;
                continue;
            }

            // Tail trails the head by a speed-scaled offset.
            b.tail_x[i] = b.head_x[i] - b.vel_x[i] * rain::STREAK_FACTOR;
            b.tail_y[i] = b.head_y[i] - b.vel_y[i] * rain::STREAK_FACTOR;
            b.tail_z[i] = b.head_z[i] - b.vel_z[i] * rain::STREAK_FACTOR;
        }
    }
}

/// Ground height under a particle: the analytic tiered lookup when the
/// surface provides one, otherwise a short downward raycast from just above
/// the head.
fn impact_height(surface: &dyn CollisionSurface, x: f32, y: f32, z: f32) -> Option<f32> {
    surface.height_at(x, z).or_else(|| {
        let ray = Ray::new(Vec3::new(x, y + 0.5, z), -Vec3::Y);
        surface
            .cast_ray(&ray, rain::HIT_BAND + 1.0)
            .map(|hit| hit.point.y)
    })
}

fn spawn_row(
    buffer: &mut StreakBuffer,
    i: usize,
    zone: &Zone,
    wind: (f32, f32),
    rng: &mut impl Rng,
) {
    let x = zone.random_x(rng);
    let y = rng.gen_range(rain::SPAWN_TOP_MIN..rain::SPAWN_TOP_MAX);
    let z = rng.gen_range(rain::DEPTH_MIN..rain::DEPTH_MAX);
    buffer.head_x[i] = x;
    buffer.head_y[i] = y;
    buffer.head_z[i] = z;
    buffer.tail_x[i] = x;
    buffer.tail_y[i] = y;
    buffer.tail_z[i] = z;
    // Newly spawned drops are already advected by the wind that carried
    // the cloud they fell from.
    buffer.vel_x[i] = wind.0;
    buffer.vel_z[i] = wind.1;
    buffer.vel_y[i] = -rng.gen_range(rain::FALL_SPEED_MIN..rain::FALL_SPEED_MAX);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collision::TieredDiscSurface;

    const DT: f32 = 1.0 / 60.0;

    fn signal(rain_intensity: f32, wind_speed: f32, wind_direction: f32) -> WeatherSignal {
        WeatherSignal {
            rain_intensity,
            wind_speed,
            wind_direction,
            ..WeatherSignal::calm()
        }
    }

    fn pedestal() -> TieredDiscSurface {
        TieredDiscSurface {
            center: Vec3::ZERO,
            cap_radius: 1.0,
            cap_height: 1.2,
            rim_radius: 1.6,
            rim_height: 0.9,
            skirt_radius: 2.4,
        }
    }

    #[test]
    fn test_zone_containment_under_random_wind() {
        let zone = Zone::new(-4.0, 4.0);
        let mut system = RainSystem::new(zone);
        let mut rng = thread_rng();
        for _ in 0..300 {
            let s = signal(
                5.0,
                rng.gen_range(0.0..120.0),
                rng.gen_range(0.0..360.0),
            );
            system.update(DT, &s, None, None);
            for i in 0..system.buffer.capacity {
                assert!(
                    zone.contains(system.buffer.head_x[i]),
                    "head {} escaped zone",
                    system.buffer.head_x[i]
                );
            }
        }
    }

    #[test]
    fn test_wrap_preserves_streak_offset_same_frame() {
        let zone = Zone::new(-4.0, 4.0);
        let mut system = RainSystem::new(zone);
        let i = 0;
        system.buffer.head_x[i] = 3.95;
        system.buffer.head_y[i] = 5.0;
        system.buffer.head_z[i] = 0.0;
        system.buffer.vel_x[i] = 6.0;
        system.buffer.vel_y[i] = -0.1;
        system.buffer.vel_z[i] = 0.0;

        system.update(DT, &signal(5.0, 0.0, 0.0), None, None);

        let b = system.buffer();
        assert!(zone.contains(b.head_x[i]));
        let expected = b.vel_x[i] * rain::STREAK_FACTOR;
        assert!(((b.head_x[i] - b.tail_x[i]) - expected).abs() < 1e-4);
    }

    #[test]
    fn test_mean_velocity_converges_to_wind_target() {
        // Steady 20 km/h wind from due east.
        let mut system = RainSystem::new(Zone::new(-4.0, 4.0));
        let s = signal(5.0, 20.0, 90.0);
        for _ in 0..100 {
            system.update(DT, &s, None, None);
        }
        let (target_x, target_z) = s.wind_target(rain::WIND_SCALE);
        let b = system.buffer();
        let mean_x: f32 = b.vel_x.iter().sum::<f32>() / b.capacity as f32;
        let mean_z: f32 = b.vel_z.iter().sum::<f32>() / b.capacity as f32;
        assert!((mean_x - target_x).abs() / target_x.abs() < 0.05);
        assert!((mean_z - target_z).abs() < 0.05 * target_x.abs() + 1e-3);
    }

    #[test]
    fn test_collision_spawns_exactly_one_splash() {
        let mut system = RainSystem::new(Zone::new(-4.0, 4.0));
        let surface = pedestal();
        let mut splashes = SplashSystem::new(16);

        // Park every row well above the surface, then stage one particle
        // just inside the hit band over the cap (height 1.2).
        for i in 0..system.buffer.capacity {
            system.buffer.head_y[i] = 10.0;
            system.buffer.vel_x[i] = 0.0;
            system.buffer.vel_z[i] = 0.0;
        }
        system.buffer.head_x[0] = 0.5;
        system.buffer.head_y[0] = 1.25;
        system.buffer.head_z[0] = 0.0;
        system.buffer.vel_y[0] = -10.0;

        let s = signal(5.0, 0.0, 0.0);
        system.update(DT, &s, Some(&surface), Some(&mut splashes));
        assert_eq!(splashes.active_count(), 1, "exactly one splash on impact");
        // The particle respawned in the top band and cannot splash again.
        assert!(system.buffer.head_y[0] >= rain::SPAWN_TOP_MIN);

        system.update(DT, &s, Some(&surface), Some(&mut splashes));
        assert_eq!(splashes.active_count(), 1, "no second splash before it falls again");
    }

    #[test]
    fn test_zero_delta_leaves_positions_unchanged() {
        let mut system = RainSystem::new(Zone::new(-4.0, 4.0));
        let s = signal(5.0, 30.0, 45.0);
        system.update(DT, &s, None, None);
        let heads: Vec<f32> = system.buffer.head_x.clone();
        let opacity = system.opacity();
        for _ in 0..5 {
            system.update(0.0, &s, None, None);
        }
        assert_eq!(system.buffer.head_x, heads);
        assert_eq!(system.opacity(), opacity);
    }

    #[test]
    fn test_active_count_tracks_intensity_within_bounds() {
        let mut system = RainSystem::new(Zone::new(-4.0, 4.0));
        let s = signal(sim::MAX_INTENSITY, 0.0, 0.0);
        for _ in 0..600 {
            system.update(DT, &s, None, None);
        }
        assert_eq!(system.active_count(), rain::CAPACITY);

        let calm = signal(0.0, 0.0, 0.0);
        for _ in 0..600 {
            system.update(DT, &calm, None, None);
        }
        assert_eq!(system.active_count(), rain::MIN_VISIBLE);
    }
}
