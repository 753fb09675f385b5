//! Render coordinator.
//!
//! Sits between rapid edit events and the expensive external renderer:
//!
//! - inputs are debounced; only the latest `(markup, theme)` of a burst is
//!   rendered
//! - every issued request gets a fresh [`RequestId`]; results for anything
//!   but the most recently issued request are discarded, since the renderer
//!   may answer out of order
//! - after new SVG is shown, the coordinator waits for the host to measure
//!   it and then hands the auto-fit decision back to the session exactly once

use super::{DisplayedRender, RenderOutcome, RenderRequest, RenderResult, RequestId};
use crate::model::{Rect, ThemeId};
use crate::timing::{Debouncer, Millis};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
struct RenderInput {
    markup: String,
    theme: ThemeId,
}

/// A result that survived the staleness check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    /// New SVG is on screen and should be measured.
    Svg {
        /// Request the SVG answers.
        id: RequestId,
        /// SVG document.
        content: String,
    },
    /// The renderer rejected the markup.
    Error {
        /// Request that failed.
        id: RequestId,
        /// Renderer message.
        message: String,
    },
}

/// Debounces render inputs and correlates results.
#[derive(Debug, Clone)]
pub struct RenderCoordinator {
    debounce: Debouncer<RenderInput>,
    next_id: u64,
    latest_issued: Option<RequestId>,
    latest_completed: bool,
    displayed: DisplayedRender,
    awaiting_measure: Option<RequestId>,
}

impl RenderCoordinator {
    /// Coordinator debouncing input by `debounce_ms`.
    pub fn new(debounce_ms: u64) -> Self {
        Self {
            debounce: Debouncer::new(debounce_ms),
            next_id: 1,
            latest_issued: None,
            latest_completed: false,
            displayed: DisplayedRender::Nothing,
            awaiting_measure: None,
        }
    }

    /// Record an edit. Restarts the debounce window.
    pub fn input(&mut self, markup: impl Into<String>, theme: ThemeId, now: Millis) {
        let superseded = self.debounce.push(
            RenderInput {
                markup: markup.into(),
                theme,
            },
            now,
        );
        if superseded.is_some() {
            debug!(window_ms = self.debounce.window_ms(), "Render debounce restarted");
        }
    }

    /// Issue a request immediately, dropping any pending debounced input.
    pub fn request_now(&mut self, markup: impl Into<String>, theme: ThemeId) -> RenderRequest {
        self.debounce.cancel();
        self.issue(RenderInput {
            markup: markup.into(),
            theme,
        })
    }

    /// Issue the debounced request once its window has elapsed.
    pub fn poll(&mut self, now: Millis) -> Option<RenderRequest> {
        let input = self.debounce.poll(now)?;
        Some(self.issue(input))
    }

    /// When the pending debounce fires, if any.
    pub fn deadline(&self) -> Option<Millis> {
        self.debounce.deadline()
    }

    /// Accept a renderer answer. Returns `None` for superseded or duplicate
    /// results.
    pub fn complete(&mut self, result: RenderResult) -> Option<Completion> {
        if self.latest_issued != Some(result.id) || self.latest_completed {
            debug!(
                id = %result.id,
                latest = ?self.latest_issued.map(|id| id.get()),
                "Discarding stale render result"
            );
            return None;
        }
        self.latest_completed = true;

        match result.outcome {
            RenderOutcome::Svg(content) => {
                self.displayed = DisplayedRender::Svg {
                    id: result.id,
                    content: content.clone(),
                };
                self.awaiting_measure = Some(result.id);
                Some(Completion::Svg {
                    id: result.id,
                    content,
                })
            }
            RenderOutcome::Error(err) => {
                self.displayed = DisplayedRender::Error {
                    id: result.id,
                    message: err.message.clone(),
                };
                self.awaiting_measure = None;
                Some(Completion::Error {
                    id: result.id,
                    message: err.message,
                })
            }
        }
    }

    /// Whether a measurement of `id` should trigger the auto-fit policy.
    ///
    /// True at most once per displayed SVG, and only for a measurable box;
    /// a zero-sized box keeps the coordinator waiting.
    pub fn take_auto_fit(&mut self, id: RequestId, content: Rect) -> bool {
        if self.awaiting_measure != Some(id) || content.is_degenerate() {
            return false;
        }
        self.awaiting_measure = None;
        true
    }

    /// What is on screen.
    pub fn displayed(&self) -> &DisplayedRender {
        &self.displayed
    }

    /// Id of the SVG on screen, if any.
    pub fn displayed_svg_id(&self) -> Option<RequestId> {
        match self.displayed {
            DisplayedRender::Svg { id, .. } => Some(id),
            _ => None,
        }
    }

    /// Id of the most recently issued request.
    pub fn latest_issued(&self) -> Option<RequestId> {
        self.latest_issued
    }

    /// A request has been issued and its answer has not arrived yet.
    pub fn is_in_flight(&self) -> bool {
        self.latest_issued.is_some() && !self.latest_completed
    }

    fn issue(&mut self, input: RenderInput) -> RenderRequest {
        let id = RequestId::new(self.next_id);
        self.next_id += 1;
        self.latest_issued = Some(id);
        self.latest_completed = false;
        debug!(%id, theme = %input.theme, bytes = input.markup.len(), "Render requested");
        RenderRequest {
            id,
            markup: input.markup,
            theme: input.theme,
        }
    }
}

#[cfg(test)]
#[path = "coordinator_tests.rs"]
mod tests;
