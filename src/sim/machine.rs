//! Run lifecycle state machine
//!
//! ```text
//! Ready --start--> Playing <--pause--> Paused
//!                     |
//!                 collision
//!                     v
//!                 GameOver --start/restart--> Playing
//! ```
//!
//! Restart is accepted from every phase. Anything not in the table is a no-op.

use serde::{Deserialize, Serialize};

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GamePhase {
    /// Waiting for the first start
    Ready,
    /// Active gameplay, frames advance the simulation
    Playing,
    /// Frozen mid-run
    Paused,
    /// Run ended by a collision
    GameOver,
}

impl GamePhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            GamePhase::Ready => "ready",
            GamePhase::Playing => "playing",
            GamePhase::Paused => "paused",
            GamePhase::GameOver => "gameover",
        }
    }
}

/// Inputs that can move the machine between phases
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    Start,
    Restart,
    PauseToggle,
    Collision,
}

/// Next phase for `trigger` in `phase`, or `None` when the trigger is ignored
pub fn transition(phase: GamePhase, trigger: Trigger) -> Option<GamePhase> {
    use GamePhase::*;
    match (phase, trigger) {
        (Ready | GameOver, Trigger::Start) => Some(Playing),
        (_, Trigger::Restart) => Some(Playing),
        (Playing, Trigger::PauseToggle) => Some(Paused),
        (Paused, Trigger::PauseToggle) => Some(Playing),
        (Playing, Trigger::Collision) => Some(GameOver),
        _ => None,
    }
}
