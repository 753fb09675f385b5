//! PNG export planning.
//!
//! The host rasterizes; this module decides the canvas geometry, the image
//! source and the file name so copy and download behave identically.

use crate::model::{ExportError, Size};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

/// Margin around the diagram on the exported canvas, in CSS pixels.
pub const EXPORT_MARGIN: f64 = 20.0;

/// Device pixel ratio of the exported image.
pub const EXPORT_SCALE: f64 = 2.0;

/// Canvas background.
pub const EXPORT_BACKGROUND: &str = "white";

/// What the host does with the rasterized image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportKind {
    /// Save a PNG file.
    Download,
    /// Put a PNG on the clipboard.
    Copy,
}

/// Everything the host needs to rasterize the displayed SVG.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportPlan {
    /// Download or clipboard.
    pub kind: ExportKind,
    /// Canvas width in device pixels.
    pub canvas_width: u32,
    /// Canvas height in device pixels.
    pub canvas_height: u32,
    /// Context scale applied before drawing.
    pub scale: f64,
    /// Fill drawn before the image.
    pub background: &'static str,
    /// Left edge of the drawn image, in CSS pixels.
    pub offset_x: f64,
    /// Top edge of the drawn image, in CSS pixels.
    pub offset_y: f64,
    /// Drawn width in CSS pixels.
    pub draw_width: f64,
    /// Drawn height in CSS pixels.
    pub draw_height: f64,
    /// `data:image/svg+xml;base64,...`
    pub svg_data_url: String,
    /// Only set for downloads.
    pub file_name: Option<String>,
}

impl ExportPlan {
    /// Notification text once the host has finished.
    pub fn success_message(&self) -> &'static str {
        match self.kind {
            ExportKind::Download => "Diagram downloaded successfully",
            ExportKind::Copy => "Diagram copied to clipboard",
        }
    }

    /// Notification text when rasterizing fails in the host.
    pub fn failure_message(&self) -> &'static str {
        match self.kind {
            ExportKind::Download => "Download failed",
            ExportKind::Copy => "Copy failed",
        }
    }
}

/// SVG markup as a base64 data URL over its UTF-8 bytes.
pub fn svg_data_url(svg: &str) -> String {
    format!("data:image/svg+xml;base64,{}", STANDARD.encode(svg.as_bytes()))
}

/// `flow2chat-diagram-{unix_ms}.png`
pub fn export_file_name(now_ms: i64) -> String {
    format!("flow2chat-diagram-{now_ms}.png")
}

/// Plan an export of `svg` drawn at `svg_size`.
///
/// # Errors
///
/// [`ExportError::NoDiagram`] / [`ExportError::NoDiagramToCopy`] when `svg`
/// is `None`, [`ExportError::Unmeasured`] for a zero-sized diagram.
pub fn plan_export(
    kind: ExportKind,
    svg: Option<&str>,
    svg_size: Size,
    now_ms: i64,
) -> Result<ExportPlan, ExportError> {
    let svg = svg.ok_or(match kind {
        ExportKind::Download => ExportError::NoDiagram,
        ExportKind::Copy => ExportError::NoDiagramToCopy,
    })?;
    if !(svg_size.width > 0.0 && svg_size.height > 0.0) {
        return Err(ExportError::Unmeasured);
    }

    let canvas_px = |len: f64| ((len + 2.0 * EXPORT_MARGIN) * EXPORT_SCALE).floor() as u32;

    Ok(ExportPlan {
        kind,
        canvas_width: canvas_px(svg_size.width),
        canvas_height: canvas_px(svg_size.height),
        scale: EXPORT_SCALE,
        background: EXPORT_BACKGROUND,
        offset_x: EXPORT_MARGIN,
        offset_y: EXPORT_MARGIN,
        draw_width: svg_size.width,
        draw_height: svg_size.height,
        svg_data_url: svg_data_url(svg),
        file_name: match kind {
            ExportKind::Download => Some(export_file_name(now_ms)),
            ExportKind::Copy => None,
        },
    })
}
