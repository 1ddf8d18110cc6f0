use noise::{NoiseFn, Perlin};
use rand::{thread_rng, Rng};

use crate::constants::{sim, snow};
use crate::lifecycle::{FadeLifecycle, IntensitySmoother};
use crate::particles::buffer::PointBuffer;
use crate::weather::WeatherSignal;
use crate::zone::Zone;

/// Drifting snowflakes. Motion is base fall velocity plus a wind
/// contribution plus flutter sampled from a deterministic noise field of
/// position and time; not a true divergence-free curl field, just enough
/// structure to read as turbulence.
pub struct SnowSystem {
    zone: Zone,
    buffer: PointBuffer,
    lifecycle: FadeLifecycle,
    intensity: IntensitySmoother,
    active_count: usize,
    flutter: Perlin,
    time: f64,
}

impl SnowSystem {
    pub fn new(zone: Zone) -> Self {
        let mut buffer = PointBuffer::new(snow::CAPACITY);
        let mut rng = thread_rng();
        for i in 0..buffer.capacity {
            spawn_row(&mut buffer, i, &zone, &mut rng);
            buffer.pos_y[i] = rng.gen_range(snow::FLOOR_Y..snow::SPAWN_TOP_MAX);
        }
        Self {
            zone,
            buffer,
            lifecycle: FadeLifecycle::new(),
            intensity: IntensitySmoother::new(),
            active_count: snow::MIN_VISIBLE,
            flutter: Perlin::new(sim::TURBULENCE_SEED),
            time: 0.0,
        }
    }

    pub fn zone(&self) -> Zone {
        self.zone
    }

    pub fn buffer(&self) -> &PointBuffer {
        &self.buffer
    }

    pub fn active_count(&self) -> usize {
        self.active_count
    }

    pub fn opacity(&self) -> f32 {
        self.lifecycle.opacity() * snow::MAX_OPACITY
    }

    pub fn lifecycle(&self) -> &FadeLifecycle {
        &self.lifecycle
    }

    pub fn update(&mut self, dt: f32, signal: &WeatherSignal) {
        if dt <= 0.0 {
            return;
        }

        let intensity = self.intensity.advance(signal.snow_intensity, dt);
        let target = if intensity > sim::INTENSITY_EPSILON {
            1.0
        } else {
            0.0
        };
        self.lifecycle.update(dt, target);
        self.active_count = ((intensity * snow::PARTICLES_PER_INTENSITY) as usize)
            .clamp(snow::MIN_VISIBLE, snow::CAPACITY);

        self.time += f64::from(dt) * snow::TURBULENCE_TIME_SCALE;
        let (wind_x, wind_z) = signal.wind_target(snow::WIND_SCALE);

        let zone = self.zone;
        let b = &mut self.buffer;
        let mut rng = thread_rng();

        for i in 0..b.capacity {
            let fx = self.flutter.get([
                f64::from(b.pos_x[i]) * snow::TURBULENCE_FREQUENCY,
                f64::from(b.pos_y[i]) * snow::TURBULENCE_FREQUENCY,
                self.time,
            ]) as f32;
            let fz = self.flutter.get([
                f64::from(b.pos_x[i]) * snow::TURBULENCE_FREQUENCY + 31.7,
                f64::from(b.pos_y[i]) * snow::TURBULENCE_FREQUENCY - 12.9,
                self.time,
            ]) as f32;

            b.vel_x[i] = wind_x + fx * snow::TURBULENCE_STRENGTH;
            b.vel_z[i] = wind_z + fz * snow::TURBULENCE_STRENGTH;

            b.pos_x[i] += b.vel_x[i] * dt;
            b.pos_y[i] += b.vel_y[i] * dt;
            b.pos_z[i] += b.vel_z[i] * dt;

            b.pos_x[i] += zone.wrap_shift(b.pos_x[i]);

            if b.pos_y[i] < snow::FLOOR_Y {
                spawn_row(b, i, &zone, &mut rng);
            }
        }
    }
}

fn spawn_row(buffer: &mut PointBuffer, i: usize, zone: &Zone, rng: &mut impl Rng) {
    buffer.pos_x[i] = zone.random_x(rng);
    buffer.pos_y[i] = rng.gen_range(snow::SPAWN_TOP_MIN..snow::SPAWN_TOP_MAX);
    buffer.pos_z[i] = rng.gen_range(snow::DEPTH_MIN..snow::DEPTH_MAX);
    buffer.vel_x[i] = 0.0;
    buffer.vel_y[i] = -rng.gen_range(snow::FALL_SPEED_MIN..snow::FALL_SPEED_MAX);
    buffer.vel_z[i] = 0.0;
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1.0 / 60.0;

    #[test]
    fn test_zone_containment_under_random_wind() {
        let zone = Zone::new(4.0, 12.0);
        let mut system = SnowSystem::new(zone);
        let mut rng = thread_rng();
        for _ in 0..300 {
            let signal = WeatherSignal {
                snow_intensity: 6.0,
                wind_speed: rng.gen_range(0.0..120.0),
                wind_direction: rng.gen_range(0.0..360.0),
                ..WeatherSignal::calm()
            };
            system.update(DT, &signal);
            for i in 0..system.buffer.capacity {
                assert!(zone.contains(system.buffer.pos_x[i]));
            }
        }
    }

    #[test]
    fn test_flutter_is_deterministic_in_position_and_time() {
        // Two systems on the same zone see identical flutter for identical
        // particle states; only the rand-seeded spawn positions differ.
        let zone = Zone::new(-4.0, 4.0);
        let mut a = SnowSystem::new(zone);
        let mut b = SnowSystem::new(zone);
        for i in 0..a.buffer.capacity {
            b.buffer.pos_x[i] = a.buffer.pos_x[i];
            b.buffer.pos_y[i] = a.buffer.pos_y[i];
            b.buffer.pos_z[i] = a.buffer.pos_z[i];
            b.buffer.vel_y[i] = a.buffer.vel_y[i];
        }
        let signal = WeatherSignal {
            snow_intensity: 4.0,
            ..WeatherSignal::calm()
        };
        a.update(DT, &signal);
        b.update(DT, &signal);
        for i in 0..a.buffer.capacity {
            // Rows that respawned draw from rand; skip them.
            if a.buffer.pos_y[i] >= snow::SPAWN_TOP_MIN || b.buffer.pos_y[i] >= snow::SPAWN_TOP_MIN {
                continue;
            }
            assert_eq!(a.buffer.vel_x[i], b.buffer.vel_x[i]);
            assert_eq!(a.buffer.vel_z[i], b.buffer.vel_z[i]);
        }
    }

    #[test]
    fn test_zero_delta_is_idempotent() {
        let mut system = SnowSystem::new(Zone::new(-4.0, 4.0));
        let signal = WeatherSignal {
            snow_intensity: 4.0,
            wind_speed: 15.0,
            ..WeatherSignal::calm()
        };
        system.update(DT, &signal);
        let positions = system.buffer.pos_y.clone();
        for _ in 0..5 {
            system.update(0.0, &signal);
        }
        assert_eq!(system.buffer.pos_y, positions);
    }
}
