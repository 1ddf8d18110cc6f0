//! Fixed-capacity particle storage in Structure of Arrays (SOA) layout for
//! cache efficiency. Buffers are allocated once at system construction and
//! live for the application's lifetime; rows are recycled in place, never
//! freed, so transitions cause no allocation churn.

/// Streak particles: a head and a tail position per row, rendered as a line
/// segment for motion blur.
pub struct StreakBuffer {
    pub capacity: usize,

    pub head_x: Vec<f32>,
    pub head_y: Vec<f32>,
    pub head_z: Vec<f32>,

    pub tail_x: Vec<f32>,
    pub tail_y: Vec<f32>,
    pub tail_z: Vec<f32>,

    pub vel_x: Vec<f32>,
    pub vel_y: Vec<f32>,
    pub vel_z: Vec<f32>,

    /// Cleared for the remainder of a frame when a row collides and
    /// respawns, so no further physics runs on it that frame.
    pub falling: Vec<bool>,
}

impl StreakBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            head_x: vec![0.0; capacity],
            head_y: vec![0.0; capacity],
            head_z: vec![0.0; capacity],
            tail_x: vec![0.0; capacity],
            tail_y: vec![0.0; capacity],
            tail_z: vec![0.0; capacity],
            vel_x: vec![0.0; capacity],
            vel_y: vec![0.0; capacity],
            vel_z: vec![0.0; capacity],
            falling: vec![true; capacity],
        }
    }
}

/// Single-point particles.
pub struct PointBuffer {
    pub capacity: usize,

    pub pos_x: Vec<f32>,
    pub pos_y: Vec<f32>,
    pub pos_z: Vec<f32>,

    pub vel_x: Vec<f32>,
    pub vel_y: Vec<f32>,
    pub vel_z: Vec<f32>,
}

impl PointBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            pos_x: vec![0.0; capacity],
            pos_y: vec![0.0; capacity],
            pos_z: vec![0.0; capacity],
            vel_x: vec![0.0; capacity],
            vel_y: vec![0.0; capacity],
            vel_z: vec![0.0; capacity],
        }
    }
}
