//! Neon Runner - an endless runner on a 2D canvas
//!
//! Core modules:
//! - `sim`: Simulation (runner physics, hazards, collisions, run state machine)
//! - `engine`: The owned game instance tying sim, scoring and reporting together
//! - `renderer`: Drawing surface abstraction and scene painting
//! - `platform`: Browser/native platform abstraction (input, time)
//! - `persistence`: Key-value storage (LocalStorage on web)
//! - `report`: End-of-run results payload and delivery

pub mod config;
pub mod engine;
pub mod highscores;
pub mod persistence;
pub mod platform;
pub mod renderer;
pub mod report;
pub mod sim;

pub use config::{Config, SettingsSnapshot, Tunable};
pub use engine::{Engine, Scheduling};
pub use highscores::HighScore;
pub use report::{ReportError, ResultSink, RunResults};

/// Game configuration constants
pub mod consts {
    /// Name used to namespace storage keys, DOM ids and the results callback
    pub const ENGINE_NAME: &str = "neon_runner";

    /// Logical field size; the canvas is scaled to fit, never resampled
    pub const FIELD_WIDTH: f32 = 800.0;
    pub const FIELD_HEIGHT: f32 = 300.0;

    /// Runner geometry (standing pose)
    pub const RUNNER_X: f32 = 50.0;
    pub const RUNNER_WIDTH: f32 = 50.0;
    pub const RUNNER_HEIGHT: f32 = 55.0;
    /// Ducking pose keeps the feet on the ground and lowers the head
    pub const RUNNER_DUCK_HEIGHT: f32 = 30.0;
    pub const RUNNER_DUCK_DROP: f32 = RUNNER_HEIGHT - RUNNER_DUCK_HEIGHT;
    /// Leg animation flips every N frames
    pub const LEG_PHASE_FRAMES: u32 = 6;

    /// Hitbox insets from the drawn bounds
    pub const RUNNER_HITBOX_INSET: f32 = 8.0;
    pub const OBSTACLE_HITBOX_INSET: f32 = 3.0;

    /// Obstacles enter this far past the right edge
    pub const OBSTACLE_SPAWN_MARGIN: f32 = 50.0;
    /// Flyer wing phase advance per frame (radians)
    pub const WING_PHASE_STEP: f32 = 0.15;

    /// Internal score ticks per displayed point
    pub const SCORE_GRAIN: u64 = 10;

    /// Particles in the collision burst
    pub const EXPLOSION_PARTICLES: usize = 30;
    /// Number of colors in the burst palette
    pub const EXPLOSION_COLOR_COUNT: usize = 4;

    /// Background grid cell size
    pub const GRID_SIZE: f32 = 40.0;
}
