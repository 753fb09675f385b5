//! Pointer gesture translation.
//!
//! Turns raw wheel and drag input into the factors and deltas consumed by
//! [`super::ViewportEngine`].

use crate::model::Point;

/// Scale factor applied per wheel notch when zooming in.
pub const WHEEL_ZOOM_IN: f64 = 1.1;

/// Scale factor applied per wheel notch when zooming out.
pub const WHEEL_ZOOM_OUT: f64 = 0.9;

/// Map a wheel event to a zoom factor. Scrolling up (negative `delta_y`)
/// zooms in; anything else zooms out.
pub fn wheel_zoom_factor(delta_y: f64) -> f64 {
    if delta_y < 0.0 {
        WHEEL_ZOOM_IN
    } else {
        WHEEL_ZOOM_OUT
    }
}

/// Tracks a pointer drag and yields incremental pan deltas.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DragTracker {
    last: Option<Point>,
}

impl DragTracker {
    /// Begin a drag at `at`.
    pub fn start(&mut self, at: Point) {
        self.last = Some(at);
    }

    /// Delta since the previous position, or `None` when not dragging.
    pub fn move_to(&mut self, at: Point) -> Option<(f64, f64)> {
        let last = self.last.replace(at)?;
        Some((at.x - last.x, at.y - last.y))
    }

    /// Whether a drag was in progress.
    pub fn end(&mut self) -> bool {
        self.last.take().is_some()
    }

    /// Whether a drag is in progress.
    pub fn is_dragging(&self) -> bool {
        self.last.is_some()
    }
}
