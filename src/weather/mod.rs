pub mod astronomy;
pub mod report;
pub mod signal;

pub use astronomy::SkyLighting;
pub use report::{classify, is_thunderstorm, WeatherClass, WeatherReport};
pub use signal::WeatherSignal;
