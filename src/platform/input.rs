//! Input mapping
//!
//! Device events arrive from the DOM as [`InputEvent`]s and are resolved
//! against the current phase into a simulation [`Command`] or a tunable
//! change. Resolution is pure so it can be tested without a browser.

use crate::config::Tunable;
use crate::sim::{Command, GamePhase};

/// Keys the game reacts to, by `KeyboardEvent.code`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Space,
    ArrowUp,
    ArrowDown,
    /// `KeyP`
    Pause,
    Other,
}

impl Key {
    pub fn from_code(code: &str) -> Self {
        match code {
            "Space" => Key::Space,
            "ArrowUp" => Key::ArrowUp,
            "ArrowDown" => Key::ArrowDown,
            "KeyP" => Key::Pause,
            _ => Key::Other,
        }
    }

    /// Whether the browser default (page scroll) should be suppressed
    pub fn suppresses_default(&self, phase: GamePhase) -> bool {
        match self {
            Key::Space | Key::ArrowUp => true,
            Key::ArrowDown => phase == GamePhase::Playing,
            Key::Pause | Key::Other => false,
        }
    }
}

/// Raw input, already decoded from the DOM
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    KeyDown(Key),
    KeyUp(Key),
    /// Touch on the play field
    CanvasTap,
    /// Dedicated on-screen jump control
    JumpButton,
    StartButton,
    PauseButton,
    RestartButton,
    Slider(Tunable, f64),
    /// Page hidden or window blurred
    FocusLost,
}

/// What an input resolves to
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    Command(Command),
    Tune(Tunable, f64),
}

/// Primary action key or tap: starts, jumps or resumes depending on phase
fn primary(phase: GamePhase) -> Command {
    match phase {
        GamePhase::Ready | GamePhase::GameOver => Command::Start,
        GamePhase::Playing => Command::Jump,
        GamePhase::Paused => Command::PauseToggle,
    }
}

/// Resolve an input event in the context of `phase`
pub fn resolve(event: InputEvent, phase: GamePhase) -> Option<Action> {
    let command = match event {
        InputEvent::KeyDown(Key::Space | Key::ArrowUp) | InputEvent::CanvasTap => primary(phase),
        InputEvent::KeyDown(Key::ArrowDown) if phase == GamePhase::Playing => Command::DuckStart,
        InputEvent::KeyUp(Key::ArrowDown) => Command::DuckEnd,
        InputEvent::KeyDown(Key::Pause) | InputEvent::PauseButton => Command::PauseToggle,
        InputEvent::JumpButton if phase == GamePhase::Playing => Command::Jump,
        InputEvent::StartButton => Command::Start,
        InputEvent::RestartButton => Command::Restart,
        InputEvent::FocusLost if phase == GamePhase::Playing => Command::PauseToggle,
        InputEvent::Slider(tunable, value) => return Some(Action::Tune(tunable, value)),
        _ => return None,
    };
    Some(Action::Command(command))
}
