//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Time (wall clock for spawn cadence and run timing)
//! - Input events (keys, taps, buttons, sliders)
//!
//! Storage lives in `persistence`.

pub mod input;
pub mod time;

pub use input::{Action, InputEvent, Key, resolve};
pub use time::{Clock, ManualClock};

#[cfg(not(target_arch = "wasm32"))]
pub use time::SystemClock;

#[cfg(target_arch = "wasm32")]
pub use time::JsClock;
