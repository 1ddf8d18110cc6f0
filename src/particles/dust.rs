use rand::{thread_rng, Rng};

use crate::constants::dust;
use crate::lifecycle::FadeLifecycle;
use crate::particles::buffer::PointBuffer;
use crate::weather::WeatherSignal;
use crate::zone::Zone;

/// Low-altitude ambient haze that only shows in dry wind: heavy rain
/// visually washes dust out, so it is gated on both wind speed and rain
/// intensity. Particles wrap horizontally in their zone and vertically
/// within a fixed low band.
pub struct WindDustSystem {
    zone: Zone,
    buffer: PointBuffer,
    lifecycle: FadeLifecycle,
    time: f32,
}

impl WindDustSystem {
    pub fn new(zone: Zone) -> Self {
        let mut buffer = PointBuffer::new(dust::CAPACITY);
        let mut rng = thread_rng();
        for i in 0..buffer.capacity {
            buffer.pos_x[i] = zone.random_x(&mut rng);
            buffer.pos_y[i] = rng.gen_range(dust::BAND_Y_MIN..dust::BAND_Y_MAX);
            buffer.pos_z[i] = rng.gen_range(dust::DEPTH_MIN..dust::DEPTH_MAX);
        }
        Self {
            zone,
            buffer,
            lifecycle: FadeLifecycle::new(),
            time: 0.0,
        }
    }

    pub fn zone(&self) -> Zone {
        self.zone
    }

    pub fn buffer(&self) -> &PointBuffer {
        &self.buffer
    }

    /// Dust draws its whole pool; visibility is carried by opacity alone.
    pub fn active_count(&self) -> usize {
        self.buffer.capacity
    }

    pub fn opacity(&self) -> f32 {
        self.lifecycle.opacity() * dust::MAX_OPACITY
    }

    pub fn lifecycle(&self) -> &FadeLifecycle {
        &self.lifecycle
    }

    pub fn update(&mut self, dt: f32, signal: &WeatherSignal) {
        if dt <= 0.0 {
            return;
        }

        let windy = signal.wind_speed > dust::WIND_THRESHOLD
            && signal.rain_intensity < dust::RAIN_CEILING;
        self.lifecycle.update(dt, if windy { 1.0 } else { 0.0 });

        self.time += dt;
        let (wind_x, wind_z) = signal.wind_target(dust::WIND_SCALE);
        let zone = self.zone;
        let time = self.time;
        let b = &mut self.buffer;
        let y_span = dust::BAND_Y_MAX - dust::BAND_Y_MIN;
        let z_span = dust::DEPTH_MAX - dust::DEPTH_MIN;

        for i in 0..b.capacity {
            // Light sin/cos turbulence keeps the haze from reading as a
            // rigid sheet.
            let nx = ((b.pos_x[i] * 1.7 + time).sin() + (b.pos_z[i] * 2.3).cos()) * 0.5;
            let ny = ((b.pos_y[i] * 2.9 + time * 1.1).sin() + (b.pos_x[i] * 1.3).cos()) * 0.5;
            let nz = ((b.pos_z[i] * 2.1 + time * 0.9).sin() + (b.pos_y[i] * 1.9).cos()) * 0.5;

            b.vel_x[i] = wind_x + nx * dust::TURBULENCE_STRENGTH;
            b.vel_y[i] = ny * dust::TURBULENCE_STRENGTH;
            b.vel_z[i] = wind_z + nz * dust::TURBULENCE_STRENGTH;

            b.pos_x[i] += b.vel_x[i] * dt;
            b.pos_y[i] += b.vel_y[i] * dt;
            b.pos_z[i] += b.vel_z[i] * dt;

            b.pos_x[i] += zone.wrap_shift(b.pos_x[i]);
            if b.pos_y[i] > dust::BAND_Y_MAX {
                b.pos_y[i] -= y_span;
            } else if b.pos_y[i] < dust::BAND_Y_MIN {
                b.pos_y[i] += y_span;
            }
            if b.pos_z[i] > dust::DEPTH_MAX {
                b.pos_z[i] -= z_span;
            } else if b.pos_z[i] < dust::DEPTH_MIN {
                b.pos_z[i] += z_span;
            }
        }
    }
}
