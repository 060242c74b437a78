//! Per-frame simulation step and command handling
//!
//! One `tick` is one logical frame. Physics uses the frame as its time
//! step; only spawn cadence and run timing read the wall clock.

use super::collision::overlaps;
use super::machine::{GamePhase, Trigger, transition};
use super::spawn::{explosion, maybe_spawn};
use super::state::GameState;
use crate::consts::SCORE_GRAIN;

/// Player commands after input mapping
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Jump,
    DuckStart,
    DuckEnd,
    PauseToggle,
    Start,
    Restart,
}

/// Phase changes the driver needs to react to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    /// Entities recreated, clock started
    RunStarted,
    Paused,
    Resumed,
    /// Collision ended the run; the clock is stopped
    GameOver,
}

/// Apply a command at wall-clock time `now`
pub fn apply_command(state: &mut GameState, command: Command, now: f64) -> Option<GameEvent> {
    match command {
        Command::Jump => {
            if state.phase == GamePhase::Playing {
                state.runner.jump(state.config.jump_force);
            }
            None
        }
        Command::DuckStart => {
            if state.phase == GamePhase::Playing {
                state.runner.duck(true);
            }
            None
        }
        // A release is honoured in every phase so a key let go during a
        // pause cannot leave the runner stuck low
        Command::DuckEnd => {
            state.runner.duck(false);
            None
        }
        Command::Start | Command::Restart => {
            let trigger = if command == Command::Start {
                Trigger::Start
            } else {
                Trigger::Restart
            };
            let next = transition(state.phase, trigger)?;
            let previous = state.phase;
            state.reset_run(now);
            state.phase = next;
            log::info!(
                "Run started from {} (speed {:.1})",
                previous.as_str(),
                state.current_speed
            );
            Some(GameEvent::RunStarted)
        }
        Command::PauseToggle => {
            let next = transition(state.phase, Trigger::PauseToggle)?;
            log::debug!("Phase {} -> {}", state.phase.as_str(), next.as_str());
            state.phase = next;
            if next == GamePhase::Paused {
                state.clock.pause(now);
                log::info!("Paused at score {}", state.displayed_score);
                Some(GameEvent::Paused)
            } else {
                state.clock.resume(now);
                log::info!("Resumed ({:.0} ms paused in total)", state.clock.total_paused_ms);
                Some(GameEvent::Resumed)
            }
        }
    }
}

/// Advance the game by one frame. Does nothing outside `Playing`.
pub fn tick(state: &mut GameState, now: f64) -> Option<GameEvent> {
    if state.phase != GamePhase::Playing {
        return None;
    }

    let speed = state.current_speed;
    state.ground_offset += speed;

    state.runner.update(state.config.gravity);

    maybe_spawn(state, now);

    // Move hazards, drop the ones that left the field or hit the runner
    let runner_box = state.runner.hitbox();
    let mut collided = false;
    state.obstacles.retain_mut(|obstacle| {
        obstacle.update(speed);
        if overlaps(&runner_box, &obstacle.hitbox()) {
            collided = true;
            return false;
        }
        !obstacle.is_off_screen()
    });
    if collided {
        let burst = explosion(state.runner.center(), &mut state.rng);
        state.particles.extend(burst);
    }

    state.particles.retain_mut(|particle| {
        particle.update();
        particle.is_alive()
    });

    state.ticks += 1;
    if state.ticks.is_multiple_of(SCORE_GRAIN) {
        state.displayed_score = state.ticks / SCORE_GRAIN;
    }

    let max_speed = state.config.max_speed;
    if state.current_speed < max_speed {
        state.current_speed = (state.current_speed + state.config.speed_increment).min(max_speed);
    }

    if collided {
        if let Some(next) = transition(state.phase, Trigger::Collision) {
            state.phase = next;
            state.clock.end(now);
            log::info!(
                "Game over at tick {} (score {})",
                state.ticks,
                state.final_score()
            );
            return Some(GameEvent::GameOver);
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::consts::*;
    use crate::sim::state::{Obstacle, ObstacleKind};
    use proptest::prelude::*;

    const FRAME_MS: f64 = 16.0;

    /// State already in `Playing` with spawning pushed past any test horizon
    fn playing_state(seed: u64) -> (GameState, f64) {
        let config = Config {
            obstacle_frequency_ms: u32::MAX,
            ..Config::default()
        };
        let mut state = GameState::new(config, seed);
        let now = 1_000_000.0;
        apply_command(&mut state, Command::Start, now);
        (state, now)
    }

    /// A hazard that sits on the runner's hitbox after one scroll step
    fn hazard_on_runner(state: &GameState) -> Obstacle {
        let x = state.runner.x + 10.0 + state.current_speed;
        Obstacle::new(ObstacleKind::DoubleSpike, x, 230.0, 45.0, 40.0)
    }

    #[test]
    fn test_tick_ready_is_noop() {
        let mut state = GameState::new(Config::default(), 1);
        assert_eq!(tick(&mut state, 5_000.0), None);
        assert_eq!(state.ticks, 0);
        assert_eq!(state.ground_offset, 0.0);
    }

    #[test]
    fn test_start_transitions_and_resets() {
        let (state, now) = playing_state(1);
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.clock.started_at, Some(now));
        assert_eq!(state.current_speed, 6.0);
    }

    #[test]
    fn test_hundred_frames_scores_ten() {
        let (mut state, mut now) = playing_state(2);
        for _ in 0..100 {
            now += FRAME_MS;
            assert_eq!(tick(&mut state, now), None);
        }
        assert_eq!(state.displayed_score, 10);
        assert_eq!(state.phase, GamePhase::Playing);
        assert!(state.obstacles.is_empty());
    }

    #[test]
    fn test_displayed_score_is_coarse() {
        let (mut state, now) = playing_state(3);
        for i in 1..=19 {
            tick(&mut state, now + i as f64);
        }
        assert_eq!(state.ticks, 19);
        assert_eq!(state.displayed_score, 1);
    }

    #[test]
    fn test_speed_ramps_and_caps() {
        let (mut state, now) = playing_state(4);
        state.config.speed_increment = 0.5;
        for i in 0..100 {
            tick(&mut state, now + i as f64);
        }
        assert_eq!(state.current_speed, state.config.max_speed);
    }

    #[test]
    fn test_collision_ends_run() {
        let (mut state, mut now) = playing_state(5);
        for _ in 0..49 {
            now += FRAME_MS;
            tick(&mut state, now);
        }
        let hazard = hazard_on_runner(&state);
        state.obstacles.push(hazard);

        now += FRAME_MS;
        assert_eq!(tick(&mut state, now), Some(GameEvent::GameOver));
        assert_eq!(state.phase, GamePhase::GameOver);
        assert_eq!(state.final_score(), 5);
        assert_eq!(state.clock.ended_at, Some(now));
        assert!(state.obstacles.is_empty());
        assert!(state.particles.len() >= EXPLOSION_PARTICLES - 1);

        // Frozen after game over
        assert_eq!(tick(&mut state, now + FRAME_MS), None);
        assert_eq!(state.ticks, 50);
    }

    #[test]
    fn test_ducking_clears_flyer() {
        let (mut state, now) = playing_state(6);
        apply_command(&mut state, Command::DuckStart, now);
        let x = state.runner.x + state.current_speed;
        state.obstacles.push(Obstacle::new(
            ObstacleKind::Flyer { wing_phase: 0.0 },
            x,
            205.0,
            40.0,
            30.0,
        ));
        assert_eq!(tick(&mut state, now + FRAME_MS), None);
        assert_eq!(state.phase, GamePhase::Playing);

        apply_command(&mut state, Command::DuckEnd, now);
        assert_eq!(tick(&mut state, now + 2.0 * FRAME_MS), Some(GameEvent::GameOver));
    }

    #[test]
    fn test_duck_release_while_paused_stands_up() {
        let (mut state, now) = playing_state(12);
        apply_command(&mut state, Command::DuckStart, now);
        assert!(state.runner.is_ducking);

        apply_command(&mut state, Command::PauseToggle, now + 10.0);
        // Pressing while paused does nothing, releasing still counts
        apply_command(&mut state, Command::DuckEnd, now + 20.0);
        assert!(!state.runner.is_ducking);
        assert_eq!(state.runner.height, RUNNER_HEIGHT);
        apply_command(&mut state, Command::DuckStart, now + 30.0);
        assert!(!state.runner.is_ducking);

        apply_command(&mut state, Command::PauseToggle, now + 40.0);
        apply_command(&mut state, Command::Jump, now + 50.0);
        assert!(state.runner.is_jumping);
    }

    #[test]
    fn test_pause_freezes_simulation() {
        let (mut state, now) = playing_state(7);
        tick(&mut state, now + FRAME_MS);
        assert_eq!(
            apply_command(&mut state, Command::PauseToggle, now + 20.0),
            Some(GameEvent::Paused)
        );
        let snapshot = (state.ticks, state.ground_offset, state.runner.clone());
        for i in 0..10 {
            assert_eq!(tick(&mut state, now + 100.0 * i as f64), None);
        }
        assert_eq!(snapshot, (state.ticks, state.ground_offset, state.runner.clone()));

        // Commands other than pause/restart do nothing while paused
        apply_command(&mut state, Command::Jump, now + 500.0);
        assert!(!state.runner.is_jumping);

        assert_eq!(
            apply_command(&mut state, Command::PauseToggle, now + 1_020.0),
            Some(GameEvent::Resumed)
        );
        assert_eq!(state.clock.total_paused_ms, 1_000.0);
    }

    #[test]
    fn test_pause_in_game_over_is_noop() {
        let (mut state, now) = playing_state(8);
        state.obstacles.push(hazard_on_runner(&state));
        tick(&mut state, now + FRAME_MS);
        assert_eq!(state.phase, GamePhase::GameOver);

        let clock = state.clock.clone();
        assert_eq!(apply_command(&mut state, Command::PauseToggle, now + 50.0), None);
        assert_eq!(apply_command(&mut state, Command::PauseToggle, now + 90.0), None);
        assert_eq!(state.phase, GamePhase::GameOver);
        assert_eq!(state.clock, clock);
    }

    #[test]
    fn test_start_ignored_mid_run_restart_is_not() {
        let (mut state, now) = playing_state(9);
        for i in 0..30 {
            tick(&mut state, now + i as f64);
        }
        assert_eq!(apply_command(&mut state, Command::Start, now + 40.0), None);
        assert_eq!(state.ticks, 30);

        assert_eq!(
            apply_command(&mut state, Command::Restart, now + 40.0),
            Some(GameEvent::RunStarted)
        );
        assert_eq!(state.ticks, 0);
        assert_eq!(state.clock.started_at, Some(now + 40.0));
    }

    #[test]
    fn test_spawns_follow_wall_clock() {
        let config = Config::default();
        let mut state = GameState::new(config, 10);
        let start = 50_000.0;
        apply_command(&mut state, Command::Start, start);

        // Irregular frames: long stall then a burst
        tick(&mut state, start + 100.0);
        assert!(state.obstacles.is_empty());
        tick(&mut state, start + 1_600.0);
        assert_eq!(state.obstacles.len(), 1);
        tick(&mut state, start + 1_610.0);
        assert_eq!(state.obstacles.len(), 1);
    }

    fn command_strategy() -> impl Strategy<Value = Command> {
        prop_oneof![
            4 => Just(Command::Jump),
            3 => Just(Command::DuckStart),
            3 => Just(Command::DuckEnd),
            1 => Just(Command::PauseToggle),
            1 => Just(Command::Restart),
        ]
    }

    proptest! {
        #[test]
        fn prop_speed_monotone_and_capped(
            seed in any::<u64>(),
            increment in 0.0f32..0.5,
            frames in 1usize..600,
        ) {
            let (mut state, now) = playing_state(seed);
            state.config.speed_increment = increment;
            let mut last = state.current_speed;
            for i in 0..frames {
                tick(&mut state, now + i as f64 * FRAME_MS);
                prop_assert!(state.current_speed >= last);
                prop_assert!(state.current_speed <= state.config.max_speed);
                last = state.current_speed;
            }
        }

        #[test]
        fn prop_jump_and_duck_exclusive(
            seed in any::<u64>(),
            script in prop::collection::vec((command_strategy(), 0u8..4), 1..300),
        ) {
            let (mut state, mut now) = playing_state(seed);
            for (command, frames) in script {
                apply_command(&mut state, command, now);
                prop_assert!(!(state.runner.is_jumping && state.runner.is_ducking));
                for _ in 0..frames {
                    now += FRAME_MS;
                    tick(&mut state, now);
                    prop_assert!(!(state.runner.is_jumping && state.runner.is_ducking));
                }
            }
        }

        #[test]
        fn prop_obstacles_move_left_and_leave_once(seed in any::<u64>()) {
            let config = Config {
                obstacle_frequency_ms: 300,
                ..Config::default()
            };
            let mut state = GameState::new(config, seed);
            let mut now = 0.0;
            apply_command(&mut state, Command::Start, now);
            // Park the runner far above every hazard
            state.runner.ground_y = -500.0;
            state.runner.y = -500.0;

            let mut spawned = 0usize;
            let mut removed = 0usize;
            for _ in 0..2_000 {
                let before: Vec<f32> = state.obstacles.iter().map(|o| o.x).collect();
                let last_spawn = state.last_spawn_at;
                now += FRAME_MS;
                tick(&mut state, now);
                prop_assert_eq!(state.phase, GamePhase::Playing);

                let new_spawn = usize::from(state.last_spawn_at != last_spawn);
                spawned += new_spawn;
                let survivors = state.obstacles.len() - new_spawn;
                prop_assert!(survivors <= before.len());
                removed += before.len() - survivors;

                // Retained hazards keep order, each strictly further left
                let dropped = before.len() - survivors;
                for (old_x, obstacle) in before[dropped..].iter().zip(&state.obstacles) {
                    prop_assert!(obstacle.x < *old_x);
                }
                prop_assert!(state.obstacles[..survivors].iter().all(|o| !o.is_off_screen()));
            }
            prop_assert!(spawned > 0);
            prop_assert_eq!(spawned, removed + state.obstacles.len());
        }
    }
}
