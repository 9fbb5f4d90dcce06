//! Browser canvas backend.

use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use super::surface::Surface;
use crate::error::{MapError, MapResult};
use crate::geometry::{Rect, Size, Vec2};
use crate::style::TextMeasure;

fn context_2d(canvas: &HtmlCanvasElement) -> MapResult<CanvasRenderingContext2d> {
    canvas
        .get_context("2d")
        .map_err(|err| MapError::SurfaceUnavailable(format!("{err:?}")))?
        .ok_or_else(|| MapError::SurfaceUnavailable("canvas has no 2d context".to_string()))?
        .dyn_into::<CanvasRenderingContext2d>()
        .map_err(|_| MapError::SurfaceUnavailable("context is not a 2d context".to_string()))
}

/// [`Surface`] over an `HtmlCanvasElement`'s 2D context.
pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
}

impl CanvasSurface {
    pub fn new(canvas: HtmlCanvasElement) -> MapResult<Self> {
        let ctx = context_2d(&canvas)?;
        Ok(Self { canvas, ctx })
    }

    /// A measurer sharing this surface's context, so layout and paint agree.
    pub fn measure(&self) -> CanvasMeasure {
        CanvasMeasure {
            ctx: self.ctx.clone(),
        }
    }

    pub fn canvas(&self) -> &HtmlCanvasElement {
        &self.canvas
    }

    /// Match the backing store to a new pixel size.
    pub fn set_size(&self, size: Size) {
        self.canvas.set_width(size.w.max(0.0) as u32);
        self.canvas.set_height(size.h.max(0.0) as u32);
    }
}

// Canvas calls only fail on non-finite input, which the painter never passes.
impl Surface for CanvasSurface {
    fn size(&self) -> Size {
        Size::new(f64::from(self.canvas.width()), f64::from(self.canvas.height()))
    }

    fn reset_transform(&mut self) {
        let _ = self.ctx.set_transform(1.0, 0.0, 0.0, 1.0, 0.0, 0.0);
    }

    fn clear(&mut self) {
        let size = self.size();
        self.ctx.clear_rect(0.0, 0.0, size.w, size.h);
    }

    fn translate(&mut self, offset: Vec2) {
        let _ = self.ctx.translate(offset.x, offset.y);
    }

    fn fill_rect(&mut self, rect: Rect, color: &str) {
        self.ctx.set_fill_style_str(color);
        self.ctx.fill_rect(rect.x, rect.y, rect.w, rect.h);
    }

    fn stroke_rect(&mut self, rect: Rect, color: &str, line_width: f64) {
        self.ctx.set_stroke_style_str(color);
        self.ctx.set_line_width(line_width);
        self.ctx.stroke_rect(rect.x, rect.y, rect.w, rect.h);
    }

    fn quadratic_curve(&mut self, from: Vec2, control: Vec2, to: Vec2, color: &str, line_width: f64) {
        self.ctx.begin_path();
        self.ctx.move_to(from.x, from.y);
        self.ctx.quadratic_curve_to(control.x, control.y, to.x, to.y);
        self.ctx.set_stroke_style_str(color);
        self.ctx.set_line_width(line_width);
        self.ctx.stroke();
    }

    fn set_font(&mut self, font: &str) {
        self.ctx.set_font(font);
    }

    fn fill_text(&mut self, text: &str, baseline: Vec2, color: &str) {
        self.ctx.set_fill_style_str(color);
        let _ = self.ctx.fill_text(text, baseline.x, baseline.y);
    }
}

/// [`TextMeasure`] backed by `CanvasRenderingContext2d.measureText`.
pub struct CanvasMeasure {
    ctx: CanvasRenderingContext2d,
}

impl TextMeasure for CanvasMeasure {
    fn text_width(&self, text: &str, font: &str, _font_size: f64) -> f64 {
        self.ctx.set_font(font);
        self.ctx
            .measure_text(text)
            .map(|metrics| metrics.width())
            .unwrap_or(0.0)
    }
}
