pub mod buffer;
pub mod dust;
pub mod rain;
pub mod snow;
pub mod splash;

pub use buffer::{PointBuffer, StreakBuffer};
pub use dust::WindDustSystem;
pub use rain::RainSystem;
pub use snow::SnowSystem;
pub use splash::SplashSystem;
