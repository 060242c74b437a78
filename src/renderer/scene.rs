//! Scene painting
//!
//! Drawing is a pure function of `GameState`: nothing here mutates the
//! simulation or touches its RNG.

use glam::Vec2;

use super::palette::*;
use super::{Color, Layer, Paint, Stroke, Surface};
use crate::consts::{FIELD_HEIGHT, FIELD_WIDTH, GRID_SIZE};
use crate::sim::{GameState, Obstacle, ObstacleKind, Particle, Rect, Runner};

const SKY_STOPS: &[(f32, Color)] = &[(0.0, SKY_TOP), (0.5, SKY_MID), (1.0, SKY_BOTTOM)];
const RUNNER_STOPS: &[(f32, Color)] = &[(0.0, CYAN), (1.0, MAGENTA)];
const HAZARD_STOPS: &[(f32, Color)] = &[(0.0, ORANGE), (1.0, MAGENTA)];

const GRID_LINE: Stroke = Stroke::new(CYAN.with_alpha(0.1), 1.0);
const SPECKLE: Color = CYAN.with_alpha(0.1);
const SPECKLE_SPACING: usize = 20;

/// Idle bob while running on the ground
const BOUNCE_RATE: f32 = 0.15;
const BOUNCE_HEIGHT: f32 = 2.0;
/// Ducking sprite is stretched this much wider
const DUCK_STRETCH: f32 = 15.0;
const WING_SWING: f32 = 10.0;

/// Paint a full frame: background, ground, runner, hazards, particles
pub fn draw_scene(surface: &mut impl Surface, state: &GameState) {
    surface.layer(Layer::Background);
    draw_background(surface, state.ground_offset);

    surface.layer(Layer::Ground);
    draw_ground(surface, state.ground_line(), state.ground_offset);

    surface.layer(Layer::Runner);
    draw_runner(surface, &state.runner);

    surface.layer(Layer::Obstacles);
    for obstacle in &state.obstacles {
        draw_obstacle(surface, obstacle);
    }

    surface.layer(Layer::Particles);
    for particle in &state.particles {
        draw_particle(surface, particle);
    }
}

/// Gradient sky with a grid that scrolls with the ground
pub fn draw_background(surface: &mut impl Surface, ground_offset: f32) {
    let sky = Paint::Linear {
        from: Vec2::ZERO,
        to: Vec2::new(0.0, FIELD_HEIGHT),
        stops: SKY_STOPS,
    };
    surface.fill_rect(Rect::new(0.0, 0.0, FIELD_WIDTH, FIELD_HEIGHT), sky);

    let mut x = -(ground_offset % GRID_SIZE);
    while x < FIELD_WIDTH {
        surface.line(Vec2::new(x, 0.0), Vec2::new(x, FIELD_HEIGHT), GRID_LINE);
        x += GRID_SIZE;
    }
    let mut y = 0.0;
    while y < FIELD_HEIGHT {
        surface.line(Vec2::new(0.0, y), Vec2::new(FIELD_WIDTH, y), GRID_LINE);
        y += GRID_SIZE;
    }
}

/// Cheap integer mix for speckle placement
fn speckle_hash(slot: u32, offset: f32) -> u32 {
    let mut h = slot.wrapping_mul(0x9e37_79b9) ^ offset.to_bits();
    h ^= h >> 16;
    h = h.wrapping_mul(0x85eb_ca6b);
    h ^= h >> 13;
    h = h.wrapping_mul(0xc2b2_ae35);
    h ^ (h >> 16)
}

/// Glowing ground line with flickering speckles below it
pub fn draw_ground(surface: &mut impl Surface, ground_line: f32, ground_offset: f32) {
    surface.save();
    surface.set_glow(CYAN, 15.0);
    surface.line(
        Vec2::new(0.0, ground_line),
        Vec2::new(FIELD_WIDTH, ground_line),
        Stroke::new(CYAN, 3.0),
    );
    surface.restore();

    let wrap = FIELD_WIDTH + 100.0;
    for (slot, i) in (0..FIELD_WIDTH as usize).step_by(SPECKLE_SPACING).enumerate() {
        let h = speckle_hash(slot as u32, ground_offset);
        // Roughly 30% of slots light up on any frame
        if h % 100 < 70 {
            continue;
        }
        let x = (ground_offset + i as f32) % wrap - 50.0;
        let width = 3.0 + ((h >> 8) % 500) as f32 / 100.0;
        surface.fill_rect(Rect::new(x, ground_line + 5.0, width, 2.0), Paint::Solid(SPECKLE));
    }
}

pub fn draw_runner(surface: &mut impl Surface, runner: &Runner) {
    surface.save();
    surface.set_glow(CYAN, 20.0);

    let sprite_rect = if runner.is_ducking {
        Rect::new(runner.x, runner.y, runner.width + DUCK_STRETCH, runner.height)
    } else {
        let bounce = if runner.is_jumping {
            0.0
        } else {
            (runner.frame_count as f32 * BOUNCE_RATE).sin() * BOUNCE_HEIGHT
        };
        Rect::new(runner.x, runner.y + bounce, runner.width, runner.height)
    };

    if !surface.draw_sprite(sprite_rect) {
        draw_runner_fallback(surface, runner);
    }

    surface.restore();
}

/// Vector runner used until the sprite loads, or when it never does
pub fn draw_runner_fallback(surface: &mut impl Surface, runner: &Runner) {
    let (x, y, w, h) = (runner.x, runner.y, runner.width, runner.height);
    let body = Paint::Linear {
        from: Vec2::new(x, y),
        to: Vec2::new(x + w, y + h),
        stops: RUNNER_STOPS,
    };
    let outline = Some(Stroke::new(CYAN, 2.0));

    surface.round_rect(Rect::new(x, y + 15.0, w - 8.0, h - 15.0), 4.0, body, outline);
    // Head
    surface.round_rect(Rect::new(x + 15.0, y, 28.0, 20.0), 4.0, body, outline);
    // Eye
    surface.ellipse(Vec2::new(x + 35.0, y + 8.0), Vec2::splat(4.0), Paint::Solid(VOID), None);
}

pub fn draw_obstacle(surface: &mut impl Surface, obstacle: &Obstacle) {
    let Obstacle { x, y, height, .. } = *obstacle;

    surface.save();
    surface.set_glow(ORANGE, 10.0);

    let fill = Paint::Linear {
        from: Vec2::new(x, y),
        to: Vec2::new(x, y + height),
        stops: HAZARD_STOPS,
    };
    let outline = Some(Stroke::new(ORANGE, 2.0));

    match obstacle.kind {
        ObstacleKind::Spike => {
            surface.round_rect(obstacle.bounds(), 4.0, fill, outline);
            // Thorns on the approaching side
            for i in 0..3 {
                let top = y + i as f32 * 12.0;
                let thorn = [
                    Vec2::new(x - 5.0, top + 10.0),
                    Vec2::new(x, top + 15.0),
                    Vec2::new(x - 5.0, top + 20.0),
                ];
                surface.polygon(&thorn, Paint::Solid(ORANGE));
            }
        }
        ObstacleKind::DoubleSpike => {
            surface.round_rect(Rect::new(x, y + 5.0, 18.0, height - 5.0), 4.0, fill, None);
            surface.round_rect(Rect::new(x + 25.0, y, 20.0, height), 4.0, fill, outline);
        }
        ObstacleKind::Flyer { wing_phase } => {
            surface.ellipse(Vec2::new(x + 20.0, y + 15.0), Vec2::new(20.0, 12.0), fill, outline);
            let beak = [
                Vec2::new(x + 40.0, y + 15.0),
                Vec2::new(x + 50.0, y + 18.0),
                Vec2::new(x + 40.0, y + 20.0),
            ];
            surface.polygon(&beak, fill);
            surface.ellipse(Vec2::new(x + 30.0, y + 12.0), Vec2::splat(4.0), Paint::Solid(VOID), None);

            let wing_y = wing_phase.sin() * WING_SWING;
            let wing = [
                Vec2::new(x + 15.0, y + 10.0),
                Vec2::new(x + 10.0, y - 5.0 + wing_y),
                Vec2::new(x + 25.0, y + 10.0),
            ];
            surface.polygon(&wing, fill);
        }
    }

    surface.restore();
}

pub fn draw_particle(surface: &mut impl Surface, particle: &Particle) {
    let color = EXPLOSION[particle.color as usize % EXPLOSION.len()];
    let radius = (particle.size * particle.life).max(0.1);

    surface.save();
    surface.set_alpha(particle.life.max(0.0));
    surface.set_glow(color, 10.0);
    surface.ellipse(particle.pos, Vec2::splat(radius), Paint::Solid(color), None);
    surface.restore();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::renderer::{DrawLog, DrawOp};
    use crate::sim::Command;
    use crate::sim::tick::{apply_command, tick};
    use rand::SeedableRng;

    fn busy_state() -> GameState {
        let mut state = GameState::new(Config::default(), 3);
        apply_command(&mut state, Command::Start, 0.0);
        state.obstacles.push(Obstacle::new(ObstacleKind::Spike, 400.0, 230.0, 25.0, 40.0));
        state.obstacles.push(Obstacle::new(
            ObstacleKind::Flyer { wing_phase: 1.0 },
            600.0,
            180.0,
            40.0,
            30.0,
        ));
        state.particles = crate::sim::explosion(Vec2::new(75.0, 240.0), &mut state.rng);
        tick(&mut state, 1.0);
        state
    }

    #[test]
    fn test_layers_in_paint_order() {
        let mut log = DrawLog::default();
        draw_scene(&mut log, &busy_state());
        assert_eq!(
            log.layers(),
            vec![
                Layer::Background,
                Layer::Ground,
                Layer::Runner,
                Layer::Obstacles,
                Layer::Particles
            ]
        );
    }

    #[test]
    fn test_save_restore_balanced() {
        let mut log = DrawLog::default();
        draw_scene(&mut log, &busy_state());
        let saves = log.count(|op| matches!(op, DrawOp::Save));
        let restores = log.count(|op| matches!(op, DrawOp::Restore));
        assert_eq!(saves, restores);
        assert!(saves > 0);
    }

    #[test]
    fn test_fallback_runner_when_sprite_missing() {
        let runner = Runner::new(&Config::default());

        let mut missing = DrawLog::default();
        draw_runner(&mut missing, &runner);
        assert_eq!(missing.count(|op| matches!(op, DrawOp::RoundRect { .. })), 2);

        let mut loaded = DrawLog::with_sprite();
        draw_runner(&mut loaded, &runner);
        assert_eq!(loaded.count(|op| matches!(op, DrawOp::Sprite(_))), 1);
        assert_eq!(loaded.count(|op| matches!(op, DrawOp::RoundRect { .. })), 0);
    }

    #[test]
    fn test_ducking_sprite_is_wider() {
        let mut runner = Runner::new(&Config::default());
        runner.duck(true);
        let mut log = DrawLog::with_sprite();
        draw_runner(&mut log, &runner);
        let sprite = log.ops().iter().find_map(|op| match op {
            DrawOp::Sprite(rect) => Some(*rect),
            _ => None,
        });
        assert_eq!(sprite, Some(Rect::new(runner.x, runner.y, runner.width + 15.0, runner.height)));
    }

    #[test]
    fn test_grid_scrolls_with_ground() {
        let mut log = DrawLog::default();
        draw_background(&mut log, 50.0);
        let first_vertical = log.ops().iter().find_map(|op| match op {
            DrawOp::Line { from, to, .. } if from.x == to.x => Some(from.x),
            _ => None,
        });
        assert_eq!(first_vertical, Some(-10.0));
    }

    #[test]
    fn test_faded_particle_keeps_min_radius() {
        let mut rng = rand_pcg::Pcg32::seed_from_u64(1);
        let mut particle = crate::sim::explosion(Vec2::ZERO, &mut rng).remove(0);
        particle.life = 0.0;
        let mut log = DrawLog::default();
        draw_particle(&mut log, &particle);
        let radius = log.ops().iter().find_map(|op| match op {
            DrawOp::Ellipse { radii, .. } => Some(radii.x),
            _ => None,
        });
        assert_eq!(radius, Some(0.1));
    }

    #[test]
    fn test_drawing_is_deterministic() {
        let state = busy_state();
        let mut a = DrawLog::default();
        let mut b = DrawLog::default();
        draw_scene(&mut a, &state);
        draw_scene(&mut b, &state);
        assert_eq!(a.ops(), b.ops());
    }
}
