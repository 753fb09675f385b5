//! Render requests and results exchanged with the external renderer.
//!
//! The renderer itself is opaque: the session emits a [`RenderRequest`], the
//! host renders the markup however it likes and answers with a
//! [`RenderResult`] carrying the same [`RequestId`].

pub mod coordinator;

pub use coordinator::{Completion, RenderCoordinator};

use crate::model::{RenderError, ThemeId};
use std::fmt;

/// Identity of one render request. Strictly increasing within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestId(u64);

impl RequestId {
    /// Wrap a raw id.
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw id.
    pub fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Ask the renderer to turn `markup` into SVG using `theme`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderRequest {
    /// Correlates the answer with this request.
    pub id: RequestId,
    /// Diagram source.
    pub markup: String,
    /// Theme to render with.
    pub theme: ThemeId,
}

/// What the renderer produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderOutcome {
    /// Rendered SVG document.
    Svg(String),
    /// The renderer rejected the markup.
    Error(RenderError),
}

/// Renderer answer for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderResult {
    /// Id of the answered request.
    pub id: RequestId,
    /// Markup that was rendered.
    pub markup: String,
    /// Theme that was used.
    pub theme: ThemeId,
    /// SVG or error.
    pub outcome: RenderOutcome,
}

impl RenderResult {
    /// Successful answer to `request`.
    pub fn svg(request: &RenderRequest, svg: impl Into<String>) -> Self {
        Self {
            id: request.id,
            markup: request.markup.clone(),
            theme: request.theme,
            outcome: RenderOutcome::Svg(svg.into()),
        }
    }

    /// Failed answer to `request`.
    pub fn error(request: &RenderRequest, message: impl Into<String>) -> Self {
        Self {
            id: request.id,
            markup: request.markup.clone(),
            theme: request.theme,
            outcome: RenderOutcome::Error(RenderError::new(message)),
        }
    }
}

/// The result currently on screen.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DisplayedRender {
    /// Nothing rendered yet.
    #[default]
    Nothing,
    /// Last good render.
    Svg {
        /// Request that produced it.
        id: RequestId,
        /// SVG document.
        content: String,
    },
    /// Last render failed.
    Error {
        /// Request that failed.
        id: RequestId,
        /// Renderer message.
        message: String,
    },
}

impl DisplayedRender {
    /// The SVG on screen, if the last applied result succeeded.
    pub fn svg(&self) -> Option<&str> {
        match self {
            DisplayedRender::Svg { content, .. } => Some(content),
            _ => None,
        }
    }
}
