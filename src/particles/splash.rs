use glam::Vec3;

use crate::constants::splash;

/// Pooled transient impact effect shared by every zone's rain.
///
/// Slots are recycled in place: a spent splash is parked far off-screen and
/// its life zeroed, which marks it reusable. Spawn requests beyond capacity
/// are silently skipped; dropping a splash under load beats failing.
pub struct SplashSystem {
    pub capacity: usize,
    pub pos_x: Vec<f32>,
    pub pos_y: Vec<f32>,
    pub pos_z: Vec<f32>,
    /// Remaining life in 0..=1, strictly decreasing while alive.
    pub life: Vec<f32>,
}

impl SplashSystem {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            pos_x: vec![0.0; capacity],
            pos_y: vec![splash::PARK_Y; capacity],
            pos_z: vec![0.0; capacity],
            life: vec![0.0; capacity],
        }
    }

    /// Claim the first free slot. Linear scan is fine at this pool size.
    /// Returns false when the pool is exhausted.
    pub fn spawn(&mut self, position: Vec3) -> bool {
        for i in 0..self.capacity {
            if self.life[i] <= 0.0 {
                self.pos_x[i] = position.x;
                self.pos_y[i] = position.y;
                self.pos_z[i] = position.z;
                self.life[i] = 1.0;
                return true;
            }
        }
        false
    }

    pub fn active_count(&self) -> usize {
        self.life.iter().filter(|&&l| l > 0.0).count()
    }

    pub fn update(&mut self, dt: f32) {
        if dt <= 0.0 {
            return;
        }
        for i in 0..self.capacity {
            if self.life[i] > 0.0 {
                self.life[i] -= dt * splash::DECAY_PER_SEC;
                if self.life[i] <= 0.0 {
                    self.life[i] = 0.0;
                    self.pos_y[i] = splash::PARK_Y;
                }
            }
        }
    }
}
