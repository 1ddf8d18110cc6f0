use crate::constants::splash;
use crate::coordinator::ZoneId;
use crate::zone::Zone;

/// Scene layout configuration. The three temporal bands sit side by side
/// along x; the present band owns the interactive ground geometry.
#[derive(Debug, Clone)]
pub struct SceneConfig {
    pub past_zone: Zone,
    pub present_zone: Zone,
    pub future_zone: Zone,
    pub splash_capacity: usize,
}

impl SceneConfig {
    pub fn zone(&self, id: ZoneId) -> Zone {
        match id {
            ZoneId::Past => self.past_zone,
            ZoneId::Present => self.present_zone,
            ZoneId::Future => self.future_zone,
        }
    }
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            past_zone: Zone::new(-12.0, -4.0),
            present_zone: Zone::new(-4.0, 4.0),
            future_zone: Zone::new(4.0, 12.0),
            splash_capacity: splash::POOL_SIZE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_bands_are_disjoint_and_adjacent() {
        let config = SceneConfig::default();
        assert_eq!(config.past_zone.max_x, config.present_zone.min_x);
        assert_eq!(config.present_zone.max_x, config.future_zone.min_x);
    }
}
