// Stormglass constants - SINGLE SOURCE OF TRUTH
//
// All tuning values for the weather simulation live here. CPU update code
// and the renderer both read from this file so buffer capacities and
// drawable sub-ranges always agree.

/// Shared simulation constants
pub mod sim {
    /// Seconds a full fade-in or fade-out takes.
    pub const FADE_DURATION: f32 = 5.0;
    /// Exponential approach rate for intensity smoothing (per second).
    pub const INTENSITY_SMOOTHING: f32 = 3.0;
    /// Longest delta the coordinator will integrate in a single frame.
    pub const MAX_DELTA: f32 = 0.1;
    /// Intensities are expressed on a 0..=MAX_INTENSITY scale.
    pub const MAX_INTENSITY: f32 = 10.0;
    /// Intensities below this count as "no precipitation".
    pub const INTENSITY_EPSILON: f32 = 0.01;
    /// Seed for the deterministic turbulence field.
    pub const TURBULENCE_SEED: u32 = 1977;
}

/// Rain streak constants
pub mod rain {
    /// Streak particles per zone. Never resized after construction.
    pub const CAPACITY: usize = 1400;
    /// Drawable particles per unit of intensity.
    pub const PARTICLES_PER_INTENSITY: f32 = 140.0;
    /// Floor on the drawable sub-range while the system is active.
    pub const MIN_VISIBLE: usize = 40;
    /// Fall speed range in world units per second.
    pub const FALL_SPEED_MIN: f32 = 9.0;
    pub const FALL_SPEED_MAX: f32 = 13.0;
    /// Fraction of the wind target blended in per 60 Hz frame.
    pub const WIND_BLEND_PER_FRAME: f32 = 0.1;
    /// km/h of wind to world units/s of horizontal drift.
    pub const WIND_SCALE: f32 = 0.12;
    /// Tail offset per unit of velocity; streak length scales with speed.
    pub const STREAK_FACTOR: f32 = 0.04;
    /// Vertical band above the surface's highest point inside which
    /// collision is tested.
    pub const HIT_BAND: f32 = 0.6;
    /// Respawn altitude band.
    pub const SPAWN_TOP_MIN: f32 = 8.0;
    pub const SPAWN_TOP_MAX: f32 = 14.0;
    /// Below this the particle loops back to the top.
    pub const FLOOR_Y: f32 = -0.5;
    /// Scene depth band particles occupy.
    pub const DEPTH_MIN: f32 = -4.0;
    pub const DEPTH_MAX: f32 = 4.0;
    /// Peak material opacity at full fade-in.
    pub const MAX_OPACITY: f32 = 0.55;
}

/// Snow constants
pub mod snow {
    pub const CAPACITY: usize = 600;
    pub const PARTICLES_PER_INTENSITY: f32 = 60.0;
    pub const MIN_VISIBLE: usize = 30;
    pub const FALL_SPEED_MIN: f32 = 0.8;
    pub const FALL_SPEED_MAX: f32 = 1.6;
    /// Snow tracks wind more weakly than rain streaks.
    pub const WIND_SCALE: f32 = 0.05;
    /// Spatial frequency of the flutter field.
    pub const TURBULENCE_FREQUENCY: f64 = 0.45;
    /// Time scale of the flutter field.
    pub const TURBULENCE_TIME_SCALE: f64 = 0.35;
    /// Horizontal flutter amplitude in world units/s.
    pub const TURBULENCE_STRENGTH: f32 = 0.6;
    pub const SPAWN_TOP_MIN: f32 = 7.0;
    pub const SPAWN_TOP_MAX: f32 = 12.0;
    pub const FLOOR_Y: f32 = -0.5;
    pub const DEPTH_MIN: f32 = -4.0;
    pub const DEPTH_MAX: f32 = 4.0;
    pub const MAX_OPACITY: f32 = 0.85;
    pub const SPRITE_SIZE: f32 = 0.055;
}

/// Wind-blown dust constants
pub mod dust {
    pub const CAPACITY: usize = 120;
    /// Wind speed in km/h below which dust stays invisible.
    pub const WIND_THRESHOLD: f32 = 18.0;
    /// Rain intensity above which dust is washed out.
    pub const RAIN_CEILING: f32 = 2.0;
    /// Low altitude band dust lives in, wrapped top-to-bottom.
    pub const BAND_Y_MIN: f32 = 0.05;
    pub const BAND_Y_MAX: f32 = 1.8;
    pub const WIND_SCALE: f32 = 0.16;
    /// Vertical and lateral jitter amplitude in world units/s.
    pub const TURBULENCE_STRENGTH: f32 = 0.35;
    pub const DEPTH_MIN: f32 = -4.0;
    pub const DEPTH_MAX: f32 = 4.0;
    pub const MAX_OPACITY: f32 = 0.22;
    pub const SPRITE_SIZE: f32 = 0.09;
}

/// Cloud cluster constants
pub mod clouds {
    /// Clouds per zone; surplus clouds are parked off-scene, never freed.
    pub const MAX_CLOUDS: usize = 10;
    /// Instanced billboard puffs per cloud.
    pub const PUFFS_PER_CLOUD: usize = 8;
    pub const ALTITUDE_MIN: f32 = 9.0;
    pub const ALTITUDE_MAX: f32 = 13.0;
    pub const SCALE_MIN: f32 = 1.2;
    pub const SCALE_MAX: f32 = 2.4;
    /// km/h of wind to world units/s of drift.
    pub const DRIFT_SCALE: f32 = 0.03;
    /// Minimum drift so a becalmed sky still feels alive.
    pub const DRIFT_FLOOR: f32 = 0.03;
    /// Parking altitude for clouds beyond the active count.
    pub const PARK_Y: f32 = -10_000.0;
    pub const DEPTH_MIN: f32 = -5.0;
    pub const DEPTH_MAX: f32 = 5.0;
    pub const MAX_OPACITY: f32 = 0.78;
    /// Forward-scatter ("silver lining") shaping.
    pub const SILVER_EXPONENT: f32 = 8.0;
    pub const SILVER_STRENGTH: f32 = 0.9;
    /// Back-scatter diffuse weight.
    pub const BACK_STRENGTH: f32 = 0.55;
}

/// Splash pool constants
pub mod splash {
    pub const POOL_SIZE: usize = 96;
    /// Life units removed per second; a splash lives ~0.35 s.
    pub const DECAY_PER_SEC: f32 = 2.8;
    /// Cheap hide: spent splashes are parked here instead of freed.
    pub const PARK_Y: f32 = -10_000.0;
    pub const SPRITE_SIZE: f32 = 0.06;
    pub const MAX_OPACITY: f32 = 0.8;
}

/// Lightning trigger constants
pub mod lightning {
    /// Expected strikes per second while a thunderstorm code is present.
    pub const STRIKES_PER_SECOND: f32 = 0.8;
    /// Minimum seconds between strikes.
    pub const COOLDOWN: f32 = 1.5;
    /// Flash intensity units removed per second.
    pub const DECAY_PER_SEC: f32 = 2.0;
    pub const FLASH_MIN: f32 = 0.8;
    pub const FLASH_MAX: f32 = 1.2;
}
