use log::warn;
use serde::{Deserialize, Serialize};

/// Raw per-zone record handed over by the external weather provider each
/// frame. Units follow the provider: precipitation in mm, snowfall in cm,
/// cloud cover in percent, wind speed in km/h, wind direction in degrees
/// with 0 = north, clockwise.
///
/// The core never distinguishes live data from debug overrides; whatever
/// record arrives is sanitized and decoded the same way.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct WeatherReport {
    pub weather_code: u16,
    #[serde(default)]
    pub rain: f32,
    #[serde(default)]
    pub showers: f32,
    #[serde(default)]
    pub snowfall: f32,
    #[serde(default)]
    pub cloud_cover: f32,
    #[serde(default)]
    pub wind_speed: f32,
    #[serde(default)]
    pub wind_direction: f32,
}

impl Default for WeatherReport {
    fn default() -> Self {
        Self {
            weather_code: 0,
            rain: 0.0,
            showers: 0.0,
            snowfall: 0.0,
            cloud_cover: 0.0,
            wind_speed: 0.0,
            wind_direction: 0.0,
        }
    }
}

impl WeatherReport {
    /// Clamp out-of-range inputs at the ingestion boundary so the per-frame
    /// hot loops never have to revalidate. Non-finite values collapse to
    /// zero, negatives to zero, percentages to 0..=100.
    pub fn sanitized(mut self) -> Self {
        let mut clamped = false;
        for field in [
            &mut self.rain,
            &mut self.showers,
            &mut self.snowfall,
            &mut self.cloud_cover,
            &mut self.wind_speed,
        ] {
            if !field.is_finite() || *field < 0.0 {
                *field = 0.0;
                clamped = true;
            }
        }
        if !self.wind_direction.is_finite() {
            self.wind_direction = 0.0;
            clamped = true;
        }
        self.cloud_cover = self.cloud_cover.min(100.0);
        self.wind_direction = self.wind_direction.rem_euclid(360.0);
        if clamped {
            warn!("weather report contained out-of-range values, clamped");
        }
        self
    }
}

/// WMO weather interpretation code groups as reported by the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WeatherClass {
    Clear,
    Cloudy,
    Fog,
    Drizzle,
    Rain,
    FreezingRain,
    Snow,
    RainShowers,
    SnowShowers,
    Thunderstorm,
}

pub fn classify(code: u16) -> WeatherClass {
    match code {
        0 | 1 => WeatherClass::Clear,
        2 | 3 => WeatherClass::Cloudy,
        45 | 48 => WeatherClass::Fog,
        51 | 53 | 55 | 56 | 57 => WeatherClass::Drizzle,
        61 | 63 | 65 => WeatherClass::Rain,
        66 | 67 => WeatherClass::FreezingRain,
        71 | 73 | 75 | 77 => WeatherClass::Snow,
        80 | 81 | 82 => WeatherClass::RainShowers,
        85 | 86 => WeatherClass::SnowShowers,
        95 | 96 | 99 => WeatherClass::Thunderstorm,
        _ => WeatherClass::Cloudy,
    }
}

pub fn is_thunderstorm(code: u16) -> bool {
    classify(code) == WeatherClass::Thunderstorm
}

/// Rain intensity (0..=10) a code implies on its own, so a record whose
/// measured amounts are zero still renders the weather the code names.
pub fn implied_rain_intensity(code: u16) -> f32 {
    match code {
        51 => 0.8,
        53 => 1.4,
        55 => 2.0,
        56 => 1.0,
        57 => 1.6,
        61 | 66 => 2.5,
        63 | 67 => 4.5,
        65 => 7.0,
        80 => 3.0,
        81 => 5.0,
        82 => 8.0,
        95 => 7.5,
        96 => 8.5,
        99 => 9.5,
        _ => 0.0,
    }
}

/// Snow intensity (0..=10) a code implies on its own.
pub fn implied_snow_intensity(code: u16) -> f32 {
    match code {
        71 => 2.5,
        73 => 4.5,
        75 => 7.0,
        77 => 2.0,
        85 => 3.5,
        86 => 6.0,
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification() {
        assert_eq!(classify(0), WeatherClass::Clear);
        assert_eq!(classify(65), WeatherClass::Rain);
        assert_eq!(classify(75), WeatherClass::Snow);
        assert_eq!(classify(82), WeatherClass::RainShowers);
        assert!(is_thunderstorm(95));
        assert!(is_thunderstorm(99));
        assert!(!is_thunderstorm(65));
    }

    #[test]
    fn test_sanitize_clamps_bad_inputs() {
        let report = WeatherReport {
            weather_code: 61,
            rain: f32::NAN,
            showers: -3.0,
            snowfall: f32::INFINITY,
            cloud_cover: 250.0,
            wind_speed: -10.0,
            wind_direction: -90.0,
        }
        .sanitized();

        assert_eq!(report.rain, 0.0);
        assert_eq!(report.showers, 0.0);
        assert_eq!(report.snowfall, 0.0);
        assert_eq!(report.cloud_cover, 100.0);
        assert_eq!(report.wind_speed, 0.0);
        assert_eq!(report.wind_direction, 270.0);
    }

    #[test]
    fn test_report_decodes_from_provider_json() {
        let json = r#"{
            "weather_code": 95,
            "rain": 4.2,
            "showers": 1.1,
            "snowfall": 0.0,
            "cloud_cover": 88.0,
            "wind_speed": 31.5,
            "wind_direction": 245.0
        }"#;
        let report: WeatherReport = serde_json::from_str(json).unwrap();
        assert_eq!(report.weather_code, 95);
        assert!((report.rain - 4.2).abs() < 1e-6);

        // Missing optional fields default to zero.
        let sparse: WeatherReport = serde_json::from_str(r#"{"weather_code": 0}"#).unwrap();
        assert_eq!(sparse.wind_speed, 0.0);
    }
}
