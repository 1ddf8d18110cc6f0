use rand::Rng;

/// Fixed horizontal band confining one temporal weather state's particles.
/// Particles always wrap back into their own zone and never cross into a
/// neighbouring band.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Zone {
    pub min_x: f32,
    pub max_x: f32,
}

impl Zone {
    pub fn new(min_x: f32, max_x: f32) -> Self {
        debug_assert!(max_x > min_x, "zone must have positive width");
        Self { min_x, max_x }
    }

    pub fn width(&self) -> f32 {
        self.max_x - self.min_x
    }

    pub fn center(&self) -> f32 {
        (self.min_x + self.max_x) * 0.5
    }

    pub fn contains(&self, x: f32) -> bool {
        x >= self.min_x && x < self.max_x
    }

    /// Signed shift that maps `x` back into `[min_x, max_x)` by whole band
    /// widths, or 0.0 when already inside. Head and tail of a streak are
    /// shifted together by this amount so the streak stays continuous.
    pub fn wrap_shift(&self, x: f32) -> f32 {
        if self.contains(x) {
            return 0.0;
        }
        let w = self.width();
        -w * ((x - self.min_x) / w).floor()
    }

    /// Uniform random x inside the band.
    pub fn random_x(&self, rng: &mut impl Rng) -> f32 {
        rng.gen_range(self.min_x..self.max_x)
    }
}
