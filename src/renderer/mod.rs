//! 2D rendering module
//!
//! The scene is painted through the [`Surface`] trait: a small immediate-mode
//! vocabulary mirroring a Canvas 2D context. The browser build implements it
//! over `CanvasRenderingContext2d`; tests use [`DrawLog`], which records
//! every call.

use glam::Vec2;

use crate::sim::Rect;

pub mod draw_log;
pub mod scene;

#[cfg(target_arch = "wasm32")]
pub mod canvas;

pub use draw_log::{DrawLog, DrawOp};
pub use scene::draw_scene;

#[cfg(target_arch = "wasm32")]
pub use canvas::CanvasSurface;

/// RGBA color, 8-bit channels plus float alpha
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

impl Color {
    /// Opaque color from `0xRRGGBB`
    pub const fn rgb(hex: u32) -> Self {
        Self {
            r: ((hex >> 16) & 0xff) as u8,
            g: ((hex >> 8) & 0xff) as u8,
            b: (hex & 0xff) as u8,
            a: 1.0,
        }
    }

    pub const fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }

    /// CSS color string
    pub fn css(&self) -> String {
        if self.a >= 1.0 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
        }
    }
}

/// Neon palette
pub mod palette {
    use super::Color;

    pub const CYAN: Color = Color::rgb(0x00fff5);
    pub const MAGENTA: Color = Color::rgb(0xff00ff);
    pub const ORANGE: Color = Color::rgb(0xff6b35);
    pub const GREEN: Color = Color::rgb(0x39ff14);
    /// Eyes and other cut-outs
    pub const VOID: Color = Color::rgb(0x0a0a0f);

    pub const SKY_TOP: Color = Color::rgb(0x0d0d15);
    pub const SKY_MID: Color = Color::rgb(0x1a1a2e);
    pub const SKY_BOTTOM: Color = Color::rgb(0x16213e);

    /// Collision burst colors, indexed by `Particle::color`
    pub const EXPLOSION: [Color; crate::consts::EXPLOSION_COLOR_COUNT] = [CYAN, MAGENTA, ORANGE, GREEN];
}

/// Fill style
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Paint {
    Solid(Color),
    /// Linear gradient between two points
    Linear {
        from: Vec2,
        to: Vec2,
        stops: &'static [(f32, Color)],
    },
}

/// Outline style
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stroke {
    pub color: Color,
    pub width: f32,
}

impl Stroke {
    pub const fn new(color: Color, width: f32) -> Self {
        Self { color, width }
    }
}

/// Scene sections, in paint order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Layer {
    Background,
    Ground,
    Runner,
    Obstacles,
    Particles,
}

/// Immediate-mode drawing target in field coordinates
pub trait Surface {
    /// Push the current alpha and glow
    fn save(&mut self);
    fn restore(&mut self);
    fn set_alpha(&mut self, alpha: f32);
    /// Soft shadow around subsequent shapes; `blur == 0` disables it
    fn set_glow(&mut self, color: Color, blur: f32);

    fn fill_rect(&mut self, rect: Rect, paint: Paint);
    fn round_rect(&mut self, rect: Rect, radius: f32, fill: Paint, stroke: Option<Stroke>);
    fn ellipse(&mut self, center: Vec2, radii: Vec2, fill: Paint, stroke: Option<Stroke>);
    fn polygon(&mut self, points: &[Vec2], fill: Paint);
    fn line(&mut self, from: Vec2, to: Vec2, stroke: Stroke);

    /// Draw the runner sprite scaled into `rect`. Returns false if the
    /// sprite is not available, in which case nothing was drawn.
    fn draw_sprite(&mut self, rect: Rect) -> bool;

    /// Marks the start of a scene section
    fn layer(&mut self, _layer: Layer) {}
}
