use crate::constants::sim::MAX_INTENSITY;
use crate::weather::report::{implied_rain_intensity, implied_snow_intensity, WeatherReport};

/// Measured precipitation to intensity scale.
const RAIN_MM_TO_INTENSITY: f32 = 2.0;
const SNOW_CM_TO_INTENSITY: f32 = 3.0;

/// Per-zone decoded weather state. Rebuilt from the raw report every frame
/// and handed to each system; never persisted.
#[derive(Debug, Clone, Copy)]
pub struct WeatherSignal {
    /// 0..=10 scale driving streak count and opacity.
    pub rain_intensity: f32,
    pub snow_intensity: f32,
    /// Cover fraction 0..=1.
    pub cloud_cover: f32,
    /// km/h.
    pub wind_speed: f32,
    /// Degrees, 0 = north, clockwise.
    pub wind_direction: f32,
    pub weather_code: u16,
}

impl WeatherSignal {
    pub fn calm() -> Self {
        Self {
            rain_intensity: 0.0,
            snow_intensity: 0.0,
            cloud_cover: 0.0,
            wind_speed: 0.0,
            wind_direction: 0.0,
            weather_code: 0,
        }
    }

    /// Decode a raw provider record. Measured amounts and the code-implied
    /// minimum are combined so a "rain" code with no measured millimetres
    /// still rains.
    pub fn decode(report: &WeatherReport) -> Self {
        let report = report.sanitized();
        let measured_rain = (report.rain + report.showers) * RAIN_MM_TO_INTENSITY;
        let measured_snow = report.snowfall * SNOW_CM_TO_INTENSITY;
        Self {
            rain_intensity: measured_rain
                .max(implied_rain_intensity(report.weather_code))
                .min(MAX_INTENSITY),
            snow_intensity: measured_snow
                .max(implied_snow_intensity(report.weather_code))
                .min(MAX_INTENSITY),
            cloud_cover: report.cloud_cover / 100.0,
            wind_speed: report.wind_speed,
            wind_direction: report.wind_direction,
            weather_code: report.weather_code,
        }
    }

    /// Horizontal wind target in world units/s for a system's wind scale.
    /// Meteorological convention: direction is where the wind blows from,
    /// 0 = north, clockwise; the scene's +x axis points east.
    pub fn wind_target(&self, scale: f32) -> (f32, f32) {
        let rad = (90.0 - self.wind_direction).to_radians();
        (
            rad.cos() * self.wind_speed * scale,
            -rad.sin() * self.wind_speed * scale,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_implies_intensity_without_measured_amounts() {
        let report = WeatherReport {
            weather_code: 65,
            ..WeatherReport::default()
        };
        let signal = WeatherSignal::decode(&report);
        assert!((signal.rain_intensity - 7.0).abs() < 1e-6);
        assert_eq!(signal.snow_intensity, 0.0);
    }

    #[test]
    fn test_measured_amounts_override_weak_codes() {
        let report = WeatherReport {
            weather_code: 51,
            rain: 3.0,
            showers: 1.0,
            ..WeatherReport::default()
        };
        let signal = WeatherSignal::decode(&report);
        assert!((signal.rain_intensity - 8.0).abs() < 1e-6);
    }

    #[test]
    fn test_intensity_is_capped() {
        let report = WeatherReport {
            weather_code: 65,
            rain: 50.0,
            ..WeatherReport::default()
        };
        assert_eq!(WeatherSignal::decode(&report).rain_intensity, MAX_INTENSITY);
    }

    #[test]
    fn test_wind_target_axes() {
        let mut signal = WeatherSignal::calm();
        signal.wind_speed = 20.0;

        // Wind from due east blows along +x at full strength.
        signal.wind_direction = 90.0;
        let (x, z) = signal.wind_target(0.1);
        assert!((x - 2.0).abs() < 1e-5);
        assert!(z.abs() < 1e-5);

        // Wind from the north blows along -z in this layout.
        signal.wind_direction = 0.0;
        let (x, z) = signal.wind_target(0.1);
        assert!(x.abs() < 1e-5);
        assert!((z + 2.0).abs() < 1e-5);
    }
}
