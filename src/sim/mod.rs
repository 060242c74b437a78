//! Simulation module
//!
//! All gameplay logic lives here:
//! - One fixed logical step per frame
//! - Seeded RNG only
//! - Wall-clock time enters only as an explicit `now` argument
//! - No rendering or platform dependencies

pub mod clock;
pub mod collision;
pub mod machine;
pub mod spawn;
pub mod state;
pub mod tick;

pub use clock::RunClock;
pub use collision::{Rect, overlaps};
pub use machine::{GamePhase, Trigger, transition};
pub use spawn::{SPAWN_TABLE, explosion, maybe_spawn, pick_kind};
pub use state::{GameState, Obstacle, ObstacleKind, Particle, Runner};
pub use tick::{Command, GameEvent, apply_command, tick};
