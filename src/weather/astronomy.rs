use glam::Vec3;

/// Sun/moon state supplied by the external astronomy provider, plus the
/// camera position the cloud shading needs for its view-dependent term.
///
/// Passed by reference into every update that shades geometry; there is no
/// module-level lighting state anywhere in the core.
#[derive(Debug, Clone, Copy)]
pub struct SkyLighting {
    /// Direction from the scene toward the sun, normalized.
    pub sun_direction: Vec3,
    pub sun_color: Vec3,
    pub sun_intensity: f32,
    /// Direction from the scene toward the moon, normalized.
    pub moon_direction: Vec3,
    pub moon_color: Vec3,
    pub moon_intensity: f32,
    /// Flat ambient tint applied to cloud puffs.
    pub ambient: Vec3,
    pub camera_position: Vec3,
}

impl SkyLighting {
    pub fn midday() -> Self {
        Self {
            sun_direction: Vec3::new(0.3, 0.8, 0.2).normalize(),
            sun_color: Vec3::new(1.0, 0.96, 0.88),
            sun_intensity: 1.0,
            moon_direction: Vec3::new(-0.3, -0.8, -0.2).normalize(),
            moon_color: Vec3::new(0.55, 0.62, 0.78),
            moon_intensity: 0.15,
            ambient: Vec3::new(0.32, 0.35, 0.42),
            camera_position: Vec3::new(0.0, 3.0, 12.0),
        }
    }

    /// The light source that currently dominates the sky: the sun while it
    /// is meaningfully above the horizon, the moon otherwise.
    pub fn dominant_light(&self) -> (Vec3, Vec3, f32) {
        if self.sun_direction.y > 0.05 {
            (self.sun_direction, self.sun_color, self.sun_intensity)
        } else {
            (self.moon_direction, self.moon_color, self.moon_intensity)
        }
    }
}

impl Default for SkyLighting {
    fn default() -> Self {
        Self::midday()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dominant_light_switches_below_horizon() {
        let mut sky = SkyLighting::midday();
        let (dir, _, _) = sky.dominant_light();
        assert_eq!(dir, sky.sun_direction);

        sky.sun_direction = Vec3::new(0.2, -0.6, 0.0).normalize();
        sky.moon_direction = Vec3::new(-0.1, 0.7, 0.1).normalize();
        let (dir, _, intensity) = sky.dominant_light();
        assert_eq!(dir, sky.moon_direction);
        assert!(intensity < 1.0);
    }
}
