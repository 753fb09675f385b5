//! Session inputs and outputs.

use crate::export::{ExportKind, ExportPlan};
use crate::model::{Notification, Point, Rect, Size, ThemeId, ViewAction};
use crate::render::{RenderRequest, RenderResult, RequestId};

/// Everything the host forwards to the session.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// The editor text changed.
    MarkupEdited(String),
    /// A file was read into the editor.
    MarkupImported(String),
    /// A built-in template was picked.
    TemplateSelected(usize),
    /// The user picked a theme.
    ThemeSelected(ThemeId),
    /// The render button.
    RenderNow,
    /// The renderer answered a request.
    RenderCompleted(RenderResult),
    /// The host measured the SVG shown for a request.
    ContentMeasured {
        /// Request whose SVG was measured.
        request_id: RequestId,
        /// Bounding box in unscaled content coordinates.
        content: Rect,
    },
    /// The preview stage was laid out or resized.
    StageResized(Rect),
    /// Wheel over the stage at `pointer`.
    Wheel {
        /// `WheelEvent.deltaY`. Negative zooms in.
        delta_y: f64,
        /// Pointer position on the stage.
        pointer: Point,
    },
    /// Primary button pressed over the stage.
    DragStart(Point),
    /// Pointer moved.
    DragMove(Point),
    /// Primary button released or pointer left the stage.
    DragEnd,
    /// Toolbar button.
    View(ViewAction),
    /// Key press on the focused preview, as `KeyboardEvent.key`.
    KeyPressed(String),
    /// Push plan and theme to the extension.
    SaveToExtension,
    /// Build a share link and copy it.
    CopyShareLink {
        /// URL of the editor page. Its query is replaced.
        page_url: String,
    },
    /// Outcome of a [`Effect::CopyToClipboard`].
    ClipboardWritten {
        /// Whether the write went through.
        success: bool,
    },
    /// Export the displayed diagram.
    Export {
        /// Download or copy.
        kind: ExportKind,
        /// Natural size of the displayed SVG.
        svg_size: Size,
    },
}

/// Side effects for the host to perform, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Render markup with the external renderer.
    Render(RenderRequest),
    /// Replace the preview content with this SVG.
    ShowSvg {
        /// Request the SVG answers.
        id: RequestId,
        /// SVG document.
        svg: String,
    },
    /// Replace the preview content with a render error.
    ShowError {
        /// Request that failed.
        id: RequestId,
        /// Renderer message.
        message: String,
    },
    /// Measure the content just shown and report
    /// [`Event::ContentMeasured`].
    MeasureContent {
        /// Echo in the [`Event::ContentMeasured`] answer.
        request_id: RequestId,
    },
    /// Write the CSS transform of the content element.
    ApplyTransform {
        /// CSS `transform` value.
        css: String,
        /// Zoom indicator value.
        zoom_percent: u32,
    },
    /// Show a toast.
    Notify(Notification),
    /// Put text on the clipboard and report [`Event::ClipboardWritten`].
    CopyToClipboard(String),
    /// Rasterize the displayed SVG.
    Export(ExportPlan),
}

impl Effect {
    /// The toast carried by a [`Effect::Notify`].
    pub fn notification(&self) -> Option<&Notification> {
        match self {
            Effect::Notify(n) => Some(n),
            _ => None,
        }
    }
}
