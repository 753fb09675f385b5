//! Toolbar and keyboard view actions.
//!
//! Pure function mapping a [`ViewAction`] onto the viewport engine.

use crate::model::{Rect, ViewAction};
use crate::viewport::ViewportEngine;

/// Apply `action` and return whether the transform changed.
///
/// Reset and fit need a measured content box; without one, reset falls back
/// to the identity transform and fit does nothing.
pub fn handle_view_action(
    engine: &mut ViewportEngine,
    action: ViewAction,
    stage: Rect,
    content: Option<Rect>,
    zoom_step: f64,
) -> bool {
    let before = engine.state();
    match action {
        ViewAction::ZoomIn => {
            engine.zoom_at_center(zoom_step, stage);
        }
        ViewAction::ZoomOut => {
            engine.zoom_at_center(1.0 / zoom_step, stage);
        }
        ViewAction::ResetView => match content {
            Some(content) => {
                engine.reset_and_center(content, stage);
            }
            None => {
                engine.reset();
            }
        },
        ViewAction::FitToView => {
            if let Some(content) = content {
                engine.fit_to_bounds(content, stage);
            }
        }
    }
    engine.state() != before
}
