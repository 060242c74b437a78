//! Hazard spawning and the collision burst

use glam::Vec2;
use rand::Rng;

use super::state::{GameState, Obstacle, ObstacleKind, Particle};
use crate::consts::{EXPLOSION_COLOR_COUNT, EXPLOSION_PARTICLES};

/// Equal-probability pick table; spikes are listed twice for a 2:1:1 mix
pub const SPAWN_TABLE: [ObstacleKind; 4] = [
    ObstacleKind::Spike,
    ObstacleKind::Spike,
    ObstacleKind::DoubleSpike,
    ObstacleKind::Flyer { wing_phase: 0.0 },
];

/// Whether more than `cadence_ms` of wall-clock time has passed since the
/// last spawn
#[inline]
pub fn cadence_elapsed(last_spawn_at: f64, now: f64, cadence_ms: u32) -> bool {
    now - last_spawn_at > cadence_ms as f64
}

/// Draw a hazard kind from the weighted table
pub fn pick_kind<R: Rng>(rng: &mut R) -> ObstacleKind {
    SPAWN_TABLE[rng.random_range(0..SPAWN_TABLE.len())]
}

/// Spawn a hazard if the cadence allows. Returns whether one was added.
pub fn maybe_spawn(state: &mut GameState, now: f64) -> bool {
    if !cadence_elapsed(state.last_spawn_at, now, state.config.obstacle_frequency_ms) {
        return false;
    }
    let ground_line = state.ground_line();
    let kind = pick_kind(&mut state.rng);
    let obstacle = Obstacle::spawn(kind, ground_line, &mut state.rng);
    log::debug!("Spawned {} at x={}", kind.name(), obstacle.x);
    state.obstacles.push(obstacle);
    state.last_spawn_at = now;
    true
}

/// Burst of particles at `center` with colors drawn from the palette
pub fn explosion<R: Rng>(center: Vec2, rng: &mut R) -> Vec<Particle> {
    (0..EXPLOSION_PARTICLES)
        .map(|_| {
            let color = rng.random_range(0..EXPLOSION_COLOR_COUNT) as u8;
            Particle::new(center, color, &mut *rng)
        })
        .collect()
}
