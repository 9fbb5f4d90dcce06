//! Frame scheduling and painting.
//!
//! - `scheduler`: two-flag dirty tracking polled once per host tick
//! - `surface`: the drawing trait plus a recording implementation
//! - `painter`: draws a laid-out tree through a surface
//! - `canvas`: the browser canvas backend

pub mod canvas;
pub mod painter;
pub mod scheduler;
pub mod surface;

pub use canvas::{CanvasMeasure, CanvasSurface};
pub use painter::{paint, DragOverlay, PaintStats};
pub use scheduler::{FrameKind, RenderScheduler};
pub use surface::{DrawCommand, RecordingSurface, Surface};
