//! The game engine instance
//!
//! `Engine` owns everything a session needs: simulation state, high score,
//! the store it persists to, the wall clock and the results sink. It never
//! schedules anything itself. The driver calls [`Engine::frame`] once per
//! display frame and follows the returned [`Scheduling`] hint.

use crate::config::{Config, Tunable};
use crate::highscores::HighScore;
use crate::persistence::KeyValueStore;
use crate::platform::input::{Action, InputEvent, resolve};
use crate::platform::time::Clock;
use crate::renderer::{Surface, draw_scene};
use crate::report::{ReportError, ResultSink, RunResults};
use crate::sim::{Command, GameEvent, GamePhase, GameState, apply_command, tick};

/// What the driver should do with its frame callback
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scheduling {
    /// Make sure exactly one frame callback is pending
    Request,
    /// Drop the pending frame callback, if any
    Cancel,
    /// Leave scheduling as it is
    Idle,
}

impl From<Option<GameEvent>> for Scheduling {
    fn from(event: Option<GameEvent>) -> Self {
        match event {
            Some(GameEvent::RunStarted | GameEvent::Resumed) => Scheduling::Request,
            Some(GameEvent::Paused | GameEvent::GameOver) => Scheduling::Cancel,
            None => Scheduling::Idle,
        }
    }
}

pub struct Engine<S: KeyValueStore, C: Clock> {
    state: GameState,
    high_score: HighScore,
    store: S,
    clock: C,
    sink: Option<Box<dyn ResultSink>>,
    last_results: Option<RunResults>,
}

impl<S: KeyValueStore, C: Clock> Engine<S, C> {
    /// Create an engine in the `Ready` phase, reading the high score once
    pub fn new(config: Config, seed: u64, store: S, clock: C) -> Self {
        let high_score = HighScore::load(&store);
        log::info!(
            "Neon Runner engine ready (seed {}, high score {})",
            seed,
            high_score.best()
        );
        Self {
            state: GameState::new(config, seed),
            high_score,
            store,
            clock,
            sink: None,
            last_results: None,
        }
    }

    /// Register where finished-run payloads go
    pub fn with_sink(mut self, sink: impl ResultSink + 'static) -> Self {
        self.set_sink(sink);
        self
    }

    pub fn set_sink(&mut self, sink: impl ResultSink + 'static) {
        self.sink = Some(Box::new(sink));
    }

    /// Apply a player command at the current wall-clock time
    pub fn command(&mut self, command: Command) -> Scheduling {
        let now = self.clock.now_ms();
        let event = apply_command(&mut self.state, command, now);
        if event == Some(GameEvent::GameOver) {
            self.finish_run(now);
        }
        event.into()
    }

    /// Resolve a device event against the current phase and apply it
    pub fn handle_input(&mut self, event: InputEvent) -> Scheduling {
        match resolve(event, self.state.phase) {
            Some(Action::Command(command)) => self.command(command),
            Some(Action::Tune(tunable, value)) => {
                self.tune(tunable, value);
                Scheduling::Idle
            }
            None => Scheduling::Idle,
        }
    }

    /// Change a tunable on the live config. Returns false if rejected.
    pub fn tune(&mut self, tunable: Tunable, value: f64) -> bool {
        self.state.config.set_tunable(tunable, value)
    }

    /// Advance one frame without drawing. A no-op outside `Playing`.
    pub fn step(&mut self) -> Scheduling {
        if self.state.phase != GamePhase::Playing {
            return Scheduling::Idle;
        }
        let now = self.clock.now_ms();
        let event = tick(&mut self.state, now);
        if event == Some(GameEvent::GameOver) {
            self.finish_run(now);
            return Scheduling::Cancel;
        }
        Scheduling::Request
    }

    /// Advance one frame and paint it. The frame that ends a run is still
    /// drawn so the burst is visible under the game-over overlay.
    pub fn frame(&mut self, surface: &mut impl Surface) -> Scheduling {
        let scheduling = self.step();
        if scheduling != Scheduling::Idle {
            draw_scene(surface, &self.state);
        }
        scheduling
    }

    /// Paint the current state without advancing it
    pub fn draw(&self, surface: &mut impl Surface) {
        draw_scene(surface, &self.state);
    }

    fn finish_run(&mut self, ended_at: f64) {
        let results = RunResults::from_state(&self.state, ended_at);
        log::info!(
            "Run results: score {}, duration {} s, settings {:?}",
            results.score,
            results.duration,
            results.settings
        );

        // Record first so a failing callback cannot affect it
        self.high_score.submit(results.score, &mut self.store);

        match self.sink.as_mut() {
            Some(sink) => match sink.deliver(&results) {
                Ok(()) => log::debug!("Results delivered"),
                Err(e @ ReportError::MissingCallback(_)) => log::warn!("{}", e),
                Err(e) => log::error!("{}", e),
            },
            None => log::warn!("No result sink registered, results not delivered"),
        }

        self.last_results = Some(results);
    }

    pub fn phase(&self) -> GamePhase {
        self.state.phase
    }

    /// Displayed score of the current (or last) run
    pub fn score(&self) -> u64 {
        self.state.displayed_score
    }

    pub fn high_score(&self) -> u64 {
        self.high_score.best()
    }

    /// Payload of the most recently finished run
    pub fn last_results(&self) -> Option<&RunResults> {
        self.last_results.as_ref()
    }

    /// Unpaused time in the current run so far (ms)
    pub fn elapsed_ms(&self) -> f64 {
        self.state.clock.elapsed_ms(self.clock.now_ms())
    }

    pub fn config(&self) -> &Config {
        &self.state.config
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::highscores::STORAGE_KEY;
    use crate::persistence::MemoryStore;
    use crate::platform::input::Key;
    use crate::platform::time::ManualClock;
    use crate::renderer::{DrawLog, Layer};
    use crate::sim::{Obstacle, ObstacleKind};

    fn engine() -> (Engine<MemoryStore, ManualClock>, ManualClock) {
        let clock = ManualClock::new(1_000_000.0);
        let mut config = Config::default();
        config.obstacle_frequency_ms = 60_000;
        let engine = Engine::new(config, 7, MemoryStore::new(), clock.clone());
        (engine, clock)
    }

    fn block_runner(engine: &mut Engine<MemoryStore, ManualClock>) {
        let runner = engine.state().runner.bounds();
        let hazard = Obstacle::new(ObstacleKind::DoubleSpike, runner.x + 10.0, runner.y + 10.0, 45.0, 40.0);
        engine.state_mut().obstacles.push(hazard);
    }

    #[test]
    fn test_scheduling_hints() {
        let (mut engine, clock) = engine();
        let mut log = DrawLog::default();

        assert_eq!(engine.frame(&mut log), Scheduling::Idle);
        assert!(log.ops().is_empty());

        assert_eq!(engine.command(Command::Start), Scheduling::Request);
        assert_eq!(engine.command(Command::Start), Scheduling::Idle);
        clock.advance(16.0);
        assert_eq!(engine.frame(&mut log), Scheduling::Request);
        assert_eq!(log.layers().first(), Some(&Layer::Background));

        assert_eq!(engine.command(Command::PauseToggle), Scheduling::Cancel);
        assert_eq!(engine.frame(&mut log), Scheduling::Idle);
        assert_eq!(engine.command(Command::PauseToggle), Scheduling::Request);

        block_runner(&mut engine);
        assert_eq!(engine.frame(&mut log), Scheduling::Cancel);
        assert_eq!(engine.phase(), GamePhase::GameOver);
        assert_eq!(engine.command(Command::PauseToggle), Scheduling::Idle);
    }

    #[test]
    fn test_input_goes_through_phase_context() {
        let (mut engine, _clock) = engine();
        let space = InputEvent::KeyDown(Key::Space);

        assert_eq!(engine.handle_input(space), Scheduling::Request);
        assert_eq!(engine.phase(), GamePhase::Playing);

        assert_eq!(engine.handle_input(space), Scheduling::Idle);
        assert!(engine.state().runner.is_jumping);

        assert_eq!(
            engine.handle_input(InputEvent::Slider(Tunable::Gravity, 9.0)),
            Scheduling::Idle
        );
        assert!((engine.config().gravity - 1.5).abs() < f32::EPSILON);
    }

    #[test]
    fn test_game_over_records_without_sink() {
        let (mut engine, clock) = engine();
        engine.command(Command::Start);
        for _ in 0..30 {
            clock.advance(16.0);
            engine.step();
        }
        block_runner(&mut engine);
        clock.advance(16.0);
        assert_eq!(engine.step(), Scheduling::Cancel);

        let results = engine.last_results().unwrap();
        assert_eq!(results.score, 3);
        assert_eq!(engine.high_score(), 3);
        assert_eq!(engine.store().raw(STORAGE_KEY), Some("3"));
    }

    #[test]
    fn test_boot_frame_draws_without_ticking() {
        let (engine, _clock) = engine();
        let mut log = DrawLog::default();
        engine.draw(&mut log);
        assert_eq!(log.layers().len(), 5);
        assert_eq!(engine.state().ticks, 0);
        assert_eq!(engine.phase(), GamePhase::Ready);
    }
}
