//! Recording surface
//!
//! Captures every draw call so paint order and fallbacks can be asserted
//! without a browser. Also useful for headless runs.

use glam::Vec2;

use super::{Color, Layer, Paint, Stroke, Surface};
use crate::sim::Rect;

/// One recorded draw call
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Layer(Layer),
    Save,
    Restore,
    Alpha(f32),
    Glow(Color, f32),
    FillRect(Rect, Paint),
    RoundRect {
        rect: Rect,
        radius: f32,
        fill: Paint,
        stroke: Option<Stroke>,
    },
    Ellipse {
        center: Vec2,
        radii: Vec2,
        fill: Paint,
        stroke: Option<Stroke>,
    },
    Polygon(Vec<Vec2>, Paint),
    Line {
        from: Vec2,
        to: Vec2,
        stroke: Stroke,
    },
    Sprite(Rect),
}

#[derive(Debug, Clone, Default)]
pub struct DrawLog {
    ops: Vec<DrawOp>,
    sprite_ready: bool,
}

impl DrawLog {
    /// Log that behaves as if the runner sprite had loaded
    pub fn with_sprite() -> Self {
        Self {
            sprite_ready: true,
            ..Self::default()
        }
    }

    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    pub fn clear(&mut self) {
        self.ops.clear();
    }

    /// Scene sections in the order they were started
    pub fn layers(&self) -> Vec<Layer> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Layer(layer) => Some(*layer),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, pred: impl Fn(&DrawOp) -> bool) -> usize {
        self.ops.iter().filter(|op| pred(op)).count()
    }

    /// Ops recorded between the start of `layer` and the next section
    pub fn section(&self, layer: Layer) -> &[DrawOp] {
        let Some(start) = self.ops.iter().position(|op| *op == DrawOp::Layer(layer)) else {
            return &[];
        };
        let rest = &self.ops[start + 1..];
        let end = rest
            .iter()
            .position(|op| matches!(op, DrawOp::Layer(_)))
            .unwrap_or(rest.len());
        &rest[..end]
    }
}

impl Surface for DrawLog {
    fn save(&mut self) {
        self.ops.push(DrawOp::Save);
    }

    fn restore(&mut self) {
        self.ops.push(DrawOp::Restore);
    }

    fn set_alpha(&mut self, alpha: f32) {
        self.ops.push(DrawOp::Alpha(alpha));
    }

    fn set_glow(&mut self, color: Color, blur: f32) {
        self.ops.push(DrawOp::Glow(color, blur));
    }

    fn fill_rect(&mut self, rect: Rect, paint: Paint) {
        self.ops.push(DrawOp::FillRect(rect, paint));
    }

    fn round_rect(&mut self, rect: Rect, radius: f32, fill: Paint, stroke: Option<Stroke>) {
        self.ops.push(DrawOp::RoundRect {
            rect,
            radius,
            fill,
            stroke,
        });
    }

    fn ellipse(&mut self, center: Vec2, radii: Vec2, fill: Paint, stroke: Option<Stroke>) {
        self.ops.push(DrawOp::Ellipse {
            center,
            radii,
            fill,
            stroke,
        });
    }

    fn polygon(&mut self, points: &[Vec2], fill: Paint) {
        self.ops.push(DrawOp::Polygon(points.to_vec(), fill));
    }

    fn line(&mut self, from: Vec2, to: Vec2, stroke: Stroke) {
        self.ops.push(DrawOp::Line { from, to, stroke });
    }

    fn draw_sprite(&mut self, rect: Rect) -> bool {
        if self.sprite_ready {
            self.ops.push(DrawOp::Sprite(rect));
        }
        self.sprite_ready
    }

    fn layer(&mut self, layer: Layer) {
        self.ops.push(DrawOp::Layer(layer));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_section_slices_between_layers() {
        let mut log = DrawLog::default();
        log.layer(Layer::Background);
        log.save();
        log.layer(Layer::Ground);
        log.restore();
        log.restore();

        assert_eq!(log.section(Layer::Background), &[DrawOp::Save]);
        assert_eq!(log.section(Layer::Ground), &[DrawOp::Restore, DrawOp::Restore]);
        assert!(log.section(Layer::Particles).is_empty());

        log.clear();
        assert!(log.ops().is_empty());
    }
}
