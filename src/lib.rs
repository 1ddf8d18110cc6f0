//! Stormglass renders live weather over a three-band diorama: the same
//! scene shown in its past, present and future, each band running its own
//! precipitation, cloud and dust simulation from its own weather record.
//!
//! The crate splits into a CPU simulation core (`coordinator`, `particles`,
//! `clouds`, `weather`) that owns all state and is fully testable headless,
//! and a thin `render` layer that uploads fixed-capacity instance buffers
//! to the GPU each frame.

pub mod clouds;
pub mod collision;
pub mod config;
pub mod constants;
pub mod coordinator;
pub mod lifecycle;
pub mod particles;
pub mod render;
pub mod weather;
pub mod zone;

pub use clouds::CloudSystem;
pub use collision::{CollisionSurface, Ray, RayHit, TieredDiscSurface, TriangleMeshSurface};
pub use config::SceneConfig;
pub use coordinator::{WeatherEffectsCoordinator, ZoneEffects, ZoneId};
pub use lifecycle::{FadeLifecycle, FadePhase, IntensitySmoother};
pub use particles::{RainSystem, SnowSystem, SplashSystem, WindDustSystem};
pub use render::WeatherRenderer;
pub use weather::{SkyLighting, WeatherReport, WeatherSignal};
pub use zone::Zone;
