//! Wall-clock bookkeeping for a run
//!
//! Frame delivery can be irregular, so race duration is measured from
//! wall-clock timestamps rather than frame counts. Time spent paused is
//! excluded.

/// Run timing state; all timestamps are milliseconds since the Unix epoch
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunClock {
    pub started_at: Option<f64>,
    pub ended_at: Option<f64>,
    pub total_paused_ms: f64,
    pub pause_started_at: Option<f64>,
}

impl RunClock {
    /// Begin a fresh run at `now`
    pub fn start(&mut self, now: f64) {
        *self = Self {
            started_at: Some(now),
            ..Self::default()
        };
    }

    /// Mark a pause. A second call while already paused keeps the first mark.
    pub fn pause(&mut self, now: f64) {
        if self.pause_started_at.is_none() && self.ended_at.is_none() {
            self.pause_started_at = Some(now);
        }
    }

    /// Close the current pause and fold it into the paused total
    pub fn resume(&mut self, now: f64) {
        if let Some(paused_at) = self.pause_started_at.take() {
            self.total_paused_ms += (now - paused_at).max(0.0);
        }
    }

    /// Stop the clock
    pub fn end(&mut self, now: f64) {
        self.resume(now);
        if self.ended_at.is_none() {
            self.ended_at = Some(now);
        }
    }

    pub fn is_paused(&self) -> bool {
        self.pause_started_at.is_some()
    }

    /// Active race time in ms. An in-progress pause is excluded too, so the
    /// value holds still while paused.
    pub fn elapsed_ms(&self, now: f64) -> f64 {
        let Some(started) = self.started_at else {
            return 0.0;
        };
        let until = self.ended_at.unwrap_or(now);
        let open_pause = self
            .pause_started_at
            .map(|paused_at| (until - paused_at).max(0.0))
            .unwrap_or(0.0);
        (until - started - self.total_paused_ms - open_pause).max(0.0)
    }

    /// Whole seconds of the finished run (0 if it never started or ended)
    pub fn duration_secs(&self) -> u64 {
        match (self.started_at, self.ended_at) {
            (Some(started), Some(ended)) => {
                ((ended - started - self.total_paused_ms).max(0.0) / 1000.0).floor() as u64
            }
            _ => 0,
        }
    }
}
