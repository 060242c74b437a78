//! Game state and core simulation types
//!
//! Entities are owned by `GameState` and recreated at the start of every run.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::clock::RunClock;
use super::collision::Rect;
use super::machine::GamePhase;
use crate::config::Config;
use crate::consts::*;

/// The player-controlled runner
#[derive(Debug, Clone, PartialEq)]
pub struct Runner {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    /// Top edge when standing on the ground
    pub ground_y: f32,
    /// Vertical velocity (negative = upward)
    pub velocity_y: f32,
    pub is_jumping: bool,
    pub is_ducking: bool,
    /// Frames since the runner was created
    pub frame_count: u32,
    /// Leg animation frame (0 or 1)
    pub leg_phase: u8,
}

impl Runner {
    pub fn new(config: &Config) -> Self {
        let ground_y = FIELD_HEIGHT - config.ground_height - RUNNER_HEIGHT;
        Self {
            x: RUNNER_X,
            y: ground_y,
            width: RUNNER_WIDTH,
            height: RUNNER_HEIGHT,
            ground_y,
            velocity_y: 0.0,
            is_jumping: false,
            is_ducking: false,
            frame_count: 0,
            leg_phase: 0,
        }
    }

    /// Jump if grounded and standing. Returns whether the jump happened.
    pub fn jump(&mut self, jump_force: f32) -> bool {
        if self.is_jumping || self.is_ducking {
            return false;
        }
        self.velocity_y = jump_force;
        self.is_jumping = true;
        true
    }

    /// Enter or leave the ducking pose. Ignored while airborne.
    pub fn duck(&mut self, ducking: bool) -> bool {
        if self.is_jumping {
            return false;
        }
        self.is_ducking = ducking;
        if ducking {
            self.height = RUNNER_DUCK_HEIGHT;
            self.y = self.ground_y + RUNNER_DUCK_DROP;
        } else {
            self.height = RUNNER_HEIGHT;
            self.y = self.ground_y;
        }
        true
    }

    /// Ground line for the current pose
    fn ground_level(&self) -> f32 {
        if self.is_ducking {
            self.ground_y + RUNNER_DUCK_DROP
        } else {
            self.ground_y
        }
    }

    /// Integrate one frame of physics and animation
    pub fn update(&mut self, gravity: f32) {
        if self.is_jumping {
            self.velocity_y += gravity;
            self.y += self.velocity_y;

            let ground = self.ground_level();
            if self.y >= ground {
                self.y = ground;
                self.is_jumping = false;
                self.velocity_y = 0.0;
            }
        }

        self.frame_count += 1;
        if self.frame_count.is_multiple_of(LEG_PHASE_FRAMES) {
            self.leg_phase = (self.leg_phase + 1) % 2;
        }
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    pub fn hitbox(&self) -> Rect {
        self.bounds().inset(RUNNER_HITBOX_INSET)
    }

    pub fn center(&self) -> Vec2 {
        self.bounds().center()
    }
}

/// Hazard variants. Flyers carry their wing animation phase.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ObstacleKind {
    Spike,
    DoubleSpike,
    Flyer { wing_phase: f32 },
}

impl ObstacleKind {
    pub fn name(&self) -> &'static str {
        match self {
            ObstacleKind::Spike => "spike",
            ObstacleKind::DoubleSpike => "double-spike",
            ObstacleKind::Flyer { .. } => "flyer",
        }
    }
}

/// A scrolling hazard
#[derive(Debug, Clone, PartialEq)]
pub struct Obstacle {
    pub kind: ObstacleKind,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Obstacle {
    pub fn new(kind: ObstacleKind, x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            kind,
            x,
            y,
            width,
            height,
        }
    }

    /// Build a freshly spawned hazard just past the right edge, with
    /// dimensions drawn from the kind's ranges. `ground_line` is the y of
    /// the ground surface.
    pub fn spawn<R: Rng>(kind: ObstacleKind, ground_line: f32, rng: &mut R) -> Self {
        let x = FIELD_WIDTH + OBSTACLE_SPAWN_MARGIN;
        match kind {
            ObstacleKind::Spike => {
                let width = 20.0 + rng.random::<f32>() * 15.0;
                let height = 35.0 + rng.random::<f32>() * 25.0;
                Self::new(kind, x, ground_line - height, width, height)
            }
            ObstacleKind::DoubleSpike => Self::new(kind, x, ground_line - 40.0, 45.0, 40.0),
            ObstacleKind::Flyer { .. } => {
                let y = ground_line - 60.0 - rng.random::<f32>() * 40.0;
                Self::new(ObstacleKind::Flyer { wing_phase: 0.0 }, x, y, 40.0, 30.0)
            }
        }
    }

    /// Scroll left by `speed` and advance animation
    pub fn update(&mut self, speed: f32) {
        self.x -= speed;
        if let ObstacleKind::Flyer { wing_phase } = &mut self.kind {
            *wing_phase = (*wing_phase + WING_PHASE_STEP) % std::f32::consts::TAU;
        }
    }

    /// Fully past the left edge
    pub fn is_off_screen(&self) -> bool {
        self.x <= -self.width
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    pub fn hitbox(&self) -> Rect {
        self.bounds().inset(OBSTACLE_HITBOX_INSET)
    }
}

/// A particle for visual effects
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub life: f32,  // 1 -> 0
    pub decay: f32, // life lost per frame
    pub size: f32,
    pub color: u8, // Index into the burst palette
}

impl Particle {
    pub fn new<R: Rng>(pos: Vec2, color: u8, rng: &mut R) -> Self {
        let vel = Vec2::new(
            (rng.random::<f32>() - 0.5) * 4.0,
            (rng.random::<f32>() - 0.5) * 4.0,
        );
        Self {
            pos,
            vel,
            life: 1.0,
            decay: 0.02 + rng.random::<f32>() * 0.02,
            size: 2.0 + rng.random::<f32>() * 3.0,
            color,
        }
    }

    pub fn update(&mut self) {
        self.pos += self.vel;
        self.life -= self.decay;
    }

    pub fn is_alive(&self) -> bool {
        self.life > 0.0
    }
}

/// Complete game state for the single running game
#[derive(Debug, Clone)]
pub struct GameState {
    /// Live tunables (sliders write here)
    pub config: Config,
    /// Seed the RNG was created from
    pub seed: u64,
    pub(crate) rng: Pcg32,
    /// Current phase
    pub phase: GamePhase,
    pub runner: Runner,
    /// Active hazards, oldest first
    pub obstacles: Vec<Obstacle>,
    /// Visual particles (not gameplay-affecting)
    pub particles: Vec<Particle>,
    /// Frames simulated this run
    pub ticks: u64,
    /// Score shown to the player, refreshed every `SCORE_GRAIN` ticks
    pub displayed_score: u64,
    /// Current scroll speed
    pub current_speed: f32,
    /// Accumulated scroll distance for parallax
    pub ground_offset: f32,
    /// Wall-clock time of the last spawn (ms)
    pub last_spawn_at: f64,
    /// Run timing
    pub clock: RunClock,
}

impl GameState {
    /// Create a state in the `Ready` phase
    pub fn new(config: Config, seed: u64) -> Self {
        let runner = Runner::new(&config);
        let current_speed = config.initial_speed;
        Self {
            config,
            seed,
            rng: Pcg32::seed_from_u64(seed),
            phase: GamePhase::Ready,
            runner,
            obstacles: Vec::new(),
            particles: Vec::new(),
            ticks: 0,
            displayed_score: 0,
            current_speed,
            ground_offset: 0.0,
            last_spawn_at: 0.0,
            clock: RunClock::default(),
        }
    }

    /// Discard the previous run's entities and start timing a new one
    pub fn reset_run(&mut self, now: f64) {
        self.runner = Runner::new(&self.config);
        self.obstacles.clear();
        self.particles.clear();
        self.ticks = 0;
        self.displayed_score = 0;
        self.current_speed = self.config.initial_speed;
        self.last_spawn_at = now;
        self.clock.start(now);
    }

    /// Y of the ground surface
    pub fn ground_line(&self) -> f32 {
        FIELD_HEIGHT - self.config.ground_height
    }

    /// Score for the run so far
    pub fn final_score(&self) -> u64 {
        self.ticks / SCORE_GRAIN
    }
}
