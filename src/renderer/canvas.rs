//! Canvas 2D backend
//!
//! Maps [`Surface`] calls onto a `CanvasRenderingContext2d`. The canvas
//! backing store is kept at the logical field size, so field coordinates are
//! canvas pixels and CSS handles the scaling.

use std::f64::consts::TAU;

use glam::Vec2;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, HtmlImageElement};

use super::{Color, Paint, Stroke, Surface};
use crate::consts::{FIELD_HEIGHT, FIELD_WIDTH};
use crate::sim::Rect;

/// Runner sprite location, relative to the page
pub const SPRITE_URL: &str = "./assets/images/runner.webp";

pub struct CanvasSurface {
    ctx: CanvasRenderingContext2d,
    sprite: Option<HtmlImageElement>,
}

impl CanvasSurface {
    /// Wrap the canvas' 2D context and size its backing store to the field
    pub fn new(canvas: &HtmlCanvasElement) -> Result<Self, JsValue> {
        canvas.set_width(FIELD_WIDTH as u32);
        canvas.set_height(FIELD_HEIGHT as u32);
        let ctx = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("2d context unavailable"))?
            .dyn_into::<CanvasRenderingContext2d>()?;
        Ok(Self { ctx, sprite: None })
    }

    /// Start loading the runner sprite. Until it is decoded (or forever, if
    /// it fails) the vector runner is drawn instead.
    pub fn load_sprite(&mut self, url: &str) {
        let image = match HtmlImageElement::new() {
            Ok(image) => image,
            Err(e) => {
                log::warn!("Sprite unavailable ({:?}), using vector runner", e);
                return;
            }
        };
        image.set_src(url);

        let decoding = JsFuture::from(image.decode());
        let url = url.to_string();
        wasm_bindgen_futures::spawn_local(async move {
            match decoding.await {
                Ok(_) => log::info!("Sprite {} loaded", url),
                Err(e) => log::warn!("Failed to load sprite {} ({:?}), using vector runner", url, e),
            }
        });

        self.sprite = Some(image);
    }

    fn fill_style(&self, paint: Paint) {
        match paint {
            Paint::Solid(color) => self.ctx.set_fill_style_str(&color.css()),
            Paint::Linear { from, to, stops } => {
                let gradient = self.ctx.create_linear_gradient(
                    from.x as f64,
                    from.y as f64,
                    to.x as f64,
                    to.y as f64,
                );
                for (offset, color) in stops {
                    if let Err(e) = gradient.add_color_stop(*offset, &color.css()) {
                        log::debug!("Bad gradient stop: {:?}", e);
                    }
                }
                self.ctx.set_fill_style_canvas_gradient(&gradient);
            }
        }
    }

    fn stroke_style(&self, stroke: Stroke) {
        self.ctx.set_stroke_style_str(&stroke.color.css());
        self.ctx.set_line_width(stroke.width as f64);
    }

    fn finish_path(&self, fill: Paint, stroke: Option<Stroke>) {
        self.fill_style(fill);
        self.ctx.fill();
        if let Some(stroke) = stroke {
            self.stroke_style(stroke);
            self.ctx.stroke();
        }
    }

    fn round_rect_path(&self, rect: Rect, radius: f32) {
        let (x, y) = (rect.x as f64, rect.y as f64);
        let (right, bottom) = (rect.right() as f64, rect.bottom() as f64);
        let r = (radius as f64)
            .min(rect.width as f64 / 2.0)
            .min(rect.height as f64 / 2.0)
            .max(0.0);
        let ctx = &self.ctx;
        ctx.begin_path();
        ctx.move_to(x + r, y);
        let corners = [
            (right, y, right, bottom),
            (right, bottom, x, bottom),
            (x, bottom, x, y),
            (x, y, right, y),
        ];
        for (x1, y1, x2, y2) in corners {
            if let Err(e) = ctx.arc_to(x1, y1, x2, y2, r) {
                log::debug!("arc_to failed: {:?}", e);
            }
        }
        ctx.close_path();
    }
}

impl Surface for CanvasSurface {
    fn save(&mut self) {
        self.ctx.save();
    }

    fn restore(&mut self) {
        self.ctx.restore();
    }

    fn set_alpha(&mut self, alpha: f32) {
        self.ctx.set_global_alpha(alpha as f64);
    }

    fn set_glow(&mut self, color: Color, blur: f32) {
        self.ctx.set_shadow_color(&color.css());
        self.ctx.set_shadow_blur(blur as f64);
    }

    fn fill_rect(&mut self, rect: Rect, paint: Paint) {
        self.fill_style(paint);
        self.ctx
            .fill_rect(rect.x as f64, rect.y as f64, rect.width as f64, rect.height as f64);
    }

    fn round_rect(&mut self, rect: Rect, radius: f32, fill: Paint, stroke: Option<Stroke>) {
        self.round_rect_path(rect, radius);
        self.finish_path(fill, stroke);
    }

    fn ellipse(&mut self, center: Vec2, radii: Vec2, fill: Paint, stroke: Option<Stroke>) {
        self.ctx.begin_path();
        if let Err(e) = self.ctx.ellipse(
            center.x as f64,
            center.y as f64,
            radii.x as f64,
            radii.y as f64,
            0.0,
            0.0,
            TAU,
        ) {
            log::debug!("ellipse failed: {:?}", e);
            return;
        }
        self.finish_path(fill, stroke);
    }

    fn polygon(&mut self, points: &[Vec2], fill: Paint) {
        let Some((first, rest)) = points.split_first() else {
            return;
        };
        self.ctx.begin_path();
        self.ctx.move_to(first.x as f64, first.y as f64);
        for p in rest {
            self.ctx.line_to(p.x as f64, p.y as f64);
        }
        self.ctx.close_path();
        self.fill_style(fill);
        self.ctx.fill();
    }

    fn line(&mut self, from: Vec2, to: Vec2, stroke: Stroke) {
        self.stroke_style(stroke);
        self.ctx.begin_path();
        self.ctx.move_to(from.x as f64, from.y as f64);
        self.ctx.line_to(to.x as f64, to.y as f64);
        self.ctx.stroke();
    }

    fn draw_sprite(&mut self, rect: Rect) -> bool {
        let Some(image) = &self.sprite else {
            return false;
        };
        if !image.complete() || image.natural_height() == 0 {
            return false;
        }
        self.ctx
            .draw_image_with_html_image_element_and_dw_and_dh(
                image,
                rect.x as f64,
                rect.y as f64,
                rect.width as f64,
                rect.height as f64,
            )
            .is_ok()
    }
}
