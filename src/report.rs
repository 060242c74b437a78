//! Run results and their delivery
//!
//! When a run ends the engine builds a [`RunResults`] payload and hands it to
//! a [`ResultSink`]. In the browser the sink is a page-defined global
//! function; tests and the native binary use closures.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::SettingsSnapshot;
use crate::sim::GameState;

/// Name of the page-level callback the web build looks for
pub const CALLBACK_NAME: &str = "neon_runner_callback";

/// Payload emitted once per finished run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunResults {
    /// Displayed score at the end of the run
    pub score: u64,
    /// Whole seconds of unpaused play
    pub duration: u64,
    pub settings: SettingsSnapshot,
    /// ISO-8601 UTC, millisecond precision
    pub timestamp: String,
}

impl RunResults {
    /// Build the payload for a finished run. `now_ms` is the Unix time used
    /// for the timestamp.
    pub fn from_state(state: &GameState, now_ms: f64) -> Self {
        Self {
            score: state.final_score(),
            duration: state.clock.duration_secs(),
            settings: state.config.snapshot(),
            timestamp: iso_timestamp(now_ms),
        }
    }

    pub fn to_json(&self) -> Result<String, ReportError> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Format Unix milliseconds like `Date.prototype.toISOString`
pub fn iso_timestamp(unix_ms: f64) -> String {
    let ms = if unix_ms.is_finite() { unix_ms as i64 } else { 0 };
    DateTime::<Utc>::from_timestamp_millis(ms)
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
        .to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Delivery failures. None of them stop the engine.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("result callback `{0}` is not defined")]
    MissingCallback(String),

    #[error("result callback failed: {0}")]
    CallbackFailed(String),

    #[error("failed to serialize results: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Receiver for finished-run payloads
pub trait ResultSink {
    fn deliver(&mut self, results: &RunResults) -> Result<(), ReportError>;
}

impl<F> ResultSink for F
where
    F: FnMut(&RunResults) -> Result<(), ReportError>,
{
    fn deliver(&mut self, results: &RunResults) -> Result<(), ReportError> {
        self(results)
    }
}

/// Looks up the page callback at delivery time, so a callback defined after
/// boot is still picked up.
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Clone)]
pub struct JsCallbackSink {
    name: String,
}

#[cfg(target_arch = "wasm32")]
impl JsCallbackSink {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
        }
    }
}

#[cfg(target_arch = "wasm32")]
impl Default for JsCallbackSink {
    fn default() -> Self {
        Self::new(CALLBACK_NAME)
    }
}

#[cfg(target_arch = "wasm32")]
impl ResultSink for JsCallbackSink {
    fn deliver(&mut self, results: &RunResults) -> Result<(), ReportError> {
        use wasm_bindgen::{JsCast, JsValue};

        let global = js_sys::global();
        let callback = js_sys::Reflect::get(&global, &JsValue::from_str(&self.name))
            .ok()
            .and_then(|value| value.dyn_into::<js_sys::Function>().ok())
            .ok_or_else(|| ReportError::MissingCallback(self.name.clone()))?;

        let json = results.to_json()?;
        let payload = js_sys::JSON::parse(&json)
            .map_err(|e| ReportError::CallbackFailed(format!("{:?}", e)))?;
        callback
            .call1(&JsValue::NULL, &payload)
            .map(|_| ())
            .map_err(|e| ReportError::CallbackFailed(format!("{:?}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::sim::GamePhase;

    #[test]
    fn test_iso_timestamp_matches_js_shape() {
        assert_eq!(iso_timestamp(0.0), "1970-01-01T00:00:00.000Z");
        assert_eq!(
            iso_timestamp(1_700_000_000_123.0),
            "2023-11-14T22:13:20.123Z"
        );
        assert_eq!(iso_timestamp(f64::NAN), "1970-01-01T00:00:00.000Z");
    }

    #[test]
    fn test_results_from_finished_run() {
        let mut state = GameState::new(Config::default(), 1);
        state.reset_run(10_000.0);
        state.phase = GamePhase::GameOver;
        state.ticks = 57;
        state.clock.pause(12_000.0);
        state.clock.resume(14_000.0);
        state.clock.end(15_999.0);

        let results = RunResults::from_state(&state, 0.0);
        assert_eq!(results.score, 5);
        // 5999 ms of wall time, 2000 ms paused
        assert_eq!(results.duration, 3);
        assert_eq!(results.settings, Config::default().snapshot());
    }

    #[test]
    fn test_payload_shape() {
        let results = RunResults {
            score: 5,
            duration: 2,
            settings: Config::default().snapshot(),
            timestamp: iso_timestamp(0.0),
        };
        let value: serde_json::Value = serde_json::from_str(&results.to_json().unwrap()).unwrap();
        assert_eq!(value["score"], 5);
        assert_eq!(value["duration"], 2);
        assert_eq!(value["settings"]["obstacleFrequency"], 1500);
        assert_eq!(value["settings"]["initialSpeed"], 6.0);
        assert!(value["settings"]["speedIncrement"].is_number());
        assert!(value["settings"]["gravity"].is_number());
        assert_eq!(value["timestamp"], "1970-01-01T00:00:00.000Z");
    }

    #[test]
    fn test_closure_sink() {
        let mut seen = Vec::new();
        {
            let mut sink = |r: &RunResults| -> Result<(), ReportError> {
                seen.push(r.score);
                Ok(())
            };
            let results = RunResults {
                score: 9,
                duration: 1,
                settings: Config::default().snapshot(),
                timestamp: iso_timestamp(0.0),
            };
            sink.deliver(&results).unwrap();
        }
        assert_eq!(seen, vec![9]);
    }
}
