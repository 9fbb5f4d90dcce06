//! Dirty-flag frame scheduling.
//!
//! Two independent flags: relayout (geometry changed) and repaint (only
//! visuals changed). Marking is cheap and idempotent, so any burst of edits
//! between two host ticks collapses into one frame.

/// Kind of work a frame has to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    /// Recompute positions, then paint.
    Relayout,
    /// Paint from cached positions.
    Repaint,
}

#[derive(Debug, Clone)]
pub struct RenderScheduler {
    needs_relayout: bool,
    needs_repaint: bool,
    frames: u64,
}

impl RenderScheduler {
    /// A new scheduler starts dirty so the first tick paints.
    pub fn new() -> Self {
        Self {
            needs_relayout: true,
            needs_repaint: true,
            frames: 0,
        }
    }

    #[inline]
    pub fn mark_repaint(&mut self) {
        self.needs_repaint = true;
    }

    /// Geometry changed. Implies a repaint.
    #[inline]
    pub fn mark_relayout(&mut self) {
        self.needs_relayout = true;
        self.needs_repaint = true;
    }

    #[inline]
    pub fn needs_relayout(&self) -> bool {
        self.needs_relayout
    }

    #[inline]
    pub fn needs_repaint(&self) -> bool {
        self.needs_repaint
    }

    #[inline]
    pub fn is_idle(&self) -> bool {
        !self.needs_relayout && !self.needs_repaint
    }

    /// Number of frames finished so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// What this frame has to do, or `None` to skip it entirely.
    pub fn begin_frame(&self) -> Option<FrameKind> {
        if self.needs_relayout {
            Some(FrameKind::Relayout)
        } else if self.needs_repaint {
            Some(FrameKind::Repaint)
        } else {
            None
        }
    }

    /// Layout ran outside a frame. Pixels are still stale.
    pub fn layout_done(&mut self) {
        self.needs_relayout = false;
    }

    /// Clear both flags after painting.
    pub fn finish_frame(&mut self) {
        self.needs_relayout = false;
        self.needs_repaint = false;
        self.frames += 1;
    }
}

impl Default for RenderScheduler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_frame_relayouts() {
        let scheduler = RenderScheduler::new();
        assert_eq!(scheduler.begin_frame(), Some(FrameKind::Relayout));
    }

    #[test]
    fn test_idle_after_finish() {
        let mut scheduler = RenderScheduler::new();
        scheduler.finish_frame();
        assert!(scheduler.is_idle());
        assert_eq!(scheduler.begin_frame(), None);
        assert_eq!(scheduler.frames(), 1);
    }

    #[test]
    fn test_repaint_only() {
        let mut scheduler = RenderScheduler::new();
        scheduler.finish_frame();
        scheduler.mark_repaint();
        scheduler.mark_repaint();
        assert_eq!(scheduler.begin_frame(), Some(FrameKind::Repaint));
    }

    #[test]
    fn test_relayout_wins_and_implies_repaint() {
        let mut scheduler = RenderScheduler::new();
        scheduler.finish_frame();
        scheduler.mark_repaint();
        scheduler.mark_relayout();
        assert_eq!(scheduler.begin_frame(), Some(FrameKind::Relayout));

        scheduler.layout_done();
        assert!(scheduler.needs_repaint());
        assert_eq!(scheduler.begin_frame(), Some(FrameKind::Repaint));
    }
}
