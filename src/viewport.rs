//! Viewport state and coordinate transforms.
//!
//! Model space is the unscaled canvas space the layout works in. Screen space
//! is surface pixels: `screen = model * scale + center + translate`.

use crate::config::MapConfig;
use crate::geometry::{Rect, Size, Vec2};

/// Scale, pan offset and surface size.
///
/// Setters return whether anything changed so callers can mark the frame
/// dirty only on real changes.
#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    scale: f64,
    translate: Vec2,
    size: Size,
    center: Vec2,
    min_scale: f64,
    max_scale: f64,
}

impl Viewport {
    pub fn new(size: Size, config: &MapConfig) -> Self {
        let min_scale = config.min_scale.min(config.max_scale);
        let max_scale = config.max_scale.max(config.min_scale);
        Self {
            scale: 1.0_f64.clamp(min_scale, max_scale),
            translate: Vec2::ZERO,
            size,
            center: Vec2::new(size.w / 2.0, size.h / 2.0),
            min_scale,
            max_scale,
        }
    }

    #[inline]
    pub fn scale(&self) -> f64 {
        self.scale
    }

    #[inline]
    pub fn translate(&self) -> Vec2 {
        self.translate
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        self.center
    }

    #[inline]
    pub fn size(&self) -> Size {
        self.size
    }

    pub fn scale_bounds(&self) -> (f64, f64) {
        (self.min_scale, self.max_scale)
    }

    /// Set the scale, clamped to the configured bounds.
    ///
    /// Non-finite values are ignored.
    pub fn set_scale(&mut self, scale: f64) -> bool {
        if !scale.is_finite() {
            return false;
        }
        let clamped = scale.clamp(self.min_scale, self.max_scale);
        if clamped == self.scale {
            return false;
        }
        self.scale = clamped;
        true
    }

    pub fn set_translate(&mut self, translate: Vec2) -> bool {
        if !translate.x.is_finite() || !translate.y.is_finite() || translate == self.translate {
            return false;
        }
        self.translate = translate;
        true
    }

    /// Change the scale by `step`. Zooms about the model origin.
    pub fn zoom_by(&mut self, step: f64) -> bool {
        self.set_scale(self.scale + step)
    }

    pub fn pan_by(&mut self, delta: Vec2) -> bool {
        self.set_translate(self.translate + delta)
    }

    /// Track a new surface size. The center moves with it.
    pub fn resize(&mut self, size: Size) -> bool {
        if size == self.size {
            return false;
        }
        self.size = size;
        self.center = Vec2::new(size.w / 2.0, size.h / 2.0);
        true
    }

    /// Screen offset of the model origin.
    #[inline]
    pub fn origin(&self) -> Vec2 {
        self.center + self.translate
    }

    pub fn to_screen(&self, model: Vec2) -> Vec2 {
        model * self.scale + self.origin()
    }

    pub fn to_model(&self, screen: Vec2) -> Vec2 {
        (screen - self.origin()) / self.scale
    }

    pub fn rect_to_screen(&self, rect: Rect) -> Rect {
        let min = self.to_screen(rect.min());
        Rect::new(min.x, min.y, rect.w * self.scale, rect.h * self.scale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn viewport() -> Viewport {
        Viewport::new(Size::new(800.0, 600.0), &MapConfig::default())
    }

    #[test]
    fn test_defaults() {
        let vp = viewport();
        assert_eq!(vp.scale(), 1.0);
        assert_eq!(vp.translate(), Vec2::ZERO);
        assert_eq!(vp.center(), Vec2::new(400.0, 300.0));
    }

    #[test]
    fn test_set_scale_clamps_and_reports_change() {
        let mut vp = viewport();
        assert!(vp.set_scale(2.0));
        assert!(!vp.set_scale(2.0));
        assert!(vp.set_scale(100.0));
        assert_eq!(vp.scale(), 4.0);
        assert!(!vp.set_scale(50.0));
        assert!(vp.set_scale(0.0));
        assert_eq!(vp.scale(), 0.2);
        assert!(!vp.set_scale(f64::NAN));
    }

    #[test]
    fn test_zoom_pins_at_maximum() {
        let mut vp = viewport();
        for _ in 0..200 {
            vp.zoom_by(0.05);
        }
        assert_eq!(vp.scale(), 4.0);
        assert!(!vp.zoom_by(0.05));
    }

    #[test]
    fn test_set_translate_guard() {
        let mut vp = viewport();
        assert!(!vp.set_translate(Vec2::ZERO));
        assert!(vp.pan_by(Vec2::new(5.0, -3.0)));
        assert_eq!(vp.translate(), Vec2::new(5.0, -3.0));
        assert!(!vp.set_translate(Vec2::new(f64::INFINITY, 0.0)));
    }

    #[test]
    fn test_transforms() {
        let mut vp = viewport();
        vp.set_scale(2.0);
        vp.set_translate(Vec2::new(10.0, 20.0));
        assert_eq!(vp.to_screen(Vec2::new(1.0, 1.0)), Vec2::new(412.0, 322.0));
        assert_eq!(vp.to_model(Vec2::new(412.0, 322.0)), Vec2::new(1.0, 1.0));
        assert_eq!(
            vp.rect_to_screen(Rect::new(0.0, 0.0, 5.0, 5.0)),
            Rect::new(410.0, 320.0, 10.0, 10.0)
        );
    }

    #[test]
    fn test_resize_moves_center() {
        let mut vp = viewport();
        assert!(vp.resize(Size::new(100.0, 50.0)));
        assert!(!vp.resize(Size::new(100.0, 50.0)));
        assert_eq!(vp.center(), Vec2::new(50.0, 25.0));
    }
}
