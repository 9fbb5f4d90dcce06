//! Drawing surface abstraction.
//!
//! The painter issues immediate-mode calls against this trait. The browser
//! implementation wraps a 2D canvas context; tests use [`RecordingSurface`].

use crate::geometry::{Rect, Size, Vec2};

/// A 2D immediate-mode drawing target, in surface pixels.
pub trait Surface {
    /// Current surface size in pixels.
    fn size(&self) -> Size;

    fn reset_transform(&mut self);

    /// Clear the whole surface.
    fn clear(&mut self);

    fn translate(&mut self, offset: Vec2);

    fn fill_rect(&mut self, rect: Rect, color: &str);

    fn stroke_rect(&mut self, rect: Rect, color: &str, line_width: f64);

    /// Stroke a quadratic curve from `from` to `to` through `control`.
    fn quadratic_curve(&mut self, from: Vec2, control: Vec2, to: Vec2, color: &str, line_width: f64);

    fn set_font(&mut self, font: &str);

    /// Fill text with its alphabetic baseline at `baseline`.
    fn fill_text(&mut self, text: &str, baseline: Vec2, color: &str);
}

/// One recorded drawing call.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    ResetTransform,
    Clear,
    Translate(Vec2),
    FillRect { rect: Rect, color: String },
    StrokeRect { rect: Rect, color: String, line_width: f64 },
    Curve { from: Vec2, control: Vec2, to: Vec2, color: String, line_width: f64 },
    Font(String),
    Text { text: String, baseline: Vec2, color: String },
}

/// Surface that records calls instead of drawing. Used by headless hosts and
/// tests.
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    size: Size,
    commands: Vec<DrawCommand>,
}

impl RecordingSurface {
    pub fn new(size: Size) -> Self {
        Self {
            size,
            commands: Vec::new(),
        }
    }

    pub fn set_size(&mut self, size: Size) {
        self.size = size;
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Take the recorded commands, leaving the log empty.
    pub fn take_commands(&mut self) -> Vec<DrawCommand> {
        std::mem::take(&mut self.commands)
    }

    /// Texts drawn, in drawing order.
    pub fn texts(&self) -> Vec<&str> {
        self.commands
            .iter()
            .filter_map(|command| match command {
                DrawCommand::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl Surface for RecordingSurface {
    fn size(&self) -> Size {
        self.size
    }

    fn reset_transform(&mut self) {
        self.commands.push(DrawCommand::ResetTransform);
    }

    fn clear(&mut self) {
        self.commands.push(DrawCommand::Clear);
    }

    fn translate(&mut self, offset: Vec2) {
        self.commands.push(DrawCommand::Translate(offset));
    }

    fn fill_rect(&mut self, rect: Rect, color: &str) {
        self.commands.push(DrawCommand::FillRect {
            rect,
            color: color.to_string(),
        });
    }

    fn stroke_rect(&mut self, rect: Rect, color: &str, line_width: f64) {
        self.commands.push(DrawCommand::StrokeRect {
            rect,
            color: color.to_string(),
            line_width,
        });
    }

    fn quadratic_curve(&mut self, from: Vec2, control: Vec2, to: Vec2, color: &str, line_width: f64) {
        self.commands.push(DrawCommand::Curve {
            from,
            control,
            to,
            color: color.to_string(),
            line_width,
        });
    }

    fn set_font(&mut self, font: &str) {
        self.commands.push(DrawCommand::Font(font.to_string()));
    }

    fn fill_text(&mut self, text: &str, baseline: Vec2, color: &str) {
        self.commands.push(DrawCommand::Text {
            text: text.to_string(),
            baseline,
            color: color.to_string(),
        });
    }
}
