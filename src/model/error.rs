//! Error types for flowpreview.
//!
//! One `thiserror` enum per concern, gathered under [`AppError`] so hosts can
//! propagate any failure with `?`.
//!
//! # Error Hierarchy
//!
//! - [`AppError`] - Top-level error wrapping all domain-specific failures
//!   - [`DecodeError`] - Malformed share-link or persisted payloads
//!   - [`StorageError`] - Key-value store I/O and serialization failures
//!   - [`BridgeError`] - Extension did not answer, or rejected a settings push
//!   - [`ShareError`] - Share link could not be built from the page URL
//!   - [`ExportError`] - Nothing (measurable) to export
//!   - `ConfigError` / `LoggingError` - Host start-up failures
//!
//! # Recovery Strategy
//!
//! Nothing in the editing core is fatal. Decode failures fall back to the
//! default template, render errors are shown inline, bridge problems become
//! notifications and storage failures are logged and skipped. Only config and
//! logging errors, which happen before a session exists, are meant to reach
//! the host's top-level handler.

use std::path::PathBuf;
use thiserror::Error;

use crate::config::ConfigError;
use crate::logging::LoggingError;

/// Top-level error encompassing all failure modes.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration file could not be read, parsed or validated.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Tracing subscriber could not be installed.
    #[error("Logging error: {0}")]
    Logging(#[from] LoggingError),

    /// A share-link or persisted payload was malformed.
    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    /// The key-value store failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// The browser extension did not cooperate.
    #[error("Extension bridge error: {0}")]
    Bridge(#[from] BridgeError),

    /// Share link could not be produced.
    #[error("Share error: {0}")]
    Share(#[from] ShareError),

    /// Export could not be planned.
    #[error("Export error: {0}")]
    Export(#[from] ExportError),
}

/// Errors decoding share-link markup or a persisted snapshot.
///
/// Callers treat every variant as "no override" and fall back to the next
/// source in the load precedence chain.
///
/// # Examples
///
/// ```
/// use flowpreview::model::error::DecodeError;
///
/// let err = DecodeError::InvalidEncoding("Invalid symbol 33, offset 0.".to_string());
/// assert!(err.to_string().contains("Invalid symbol"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// Input is not valid base64.
    #[error("Invalid encoded text: {0}")]
    InvalidEncoding(String),

    /// Base64 decoded, but the bytes are not UTF-8.
    #[error("Encoded text is not valid UTF-8")]
    InvalidUtf8,

    /// Snapshot JSON could not be parsed.
    #[error("Malformed snapshot: {0}")]
    MalformedSnapshot(String),
}

/// The external renderer rejected the markup.
///
/// The message is shown to the user as-is. It never touches the viewport or
/// the persisted document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct RenderError {
    /// Renderer message.
    pub message: String,
}

impl RenderError {
    /// Wrap a renderer message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Key-value store failures.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Reading or writing the backing file failed.
    #[error("Storage I/O failed at {path:?}: {source}")]
    Io {
        /// File the store is backed by.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The backing file could not be encoded or decoded as JSON.
    #[error("Storage serialization failed: {0}")]
    Serialization(String),
}

/// Extension bridge failures. Both are surfaced as notifications only.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BridgeError {
    /// No `extension_connected` arrived within the timeout.
    #[error("Extension did not respond within {waited_ms}ms")]
    Timeout {
        /// Configured timeout in milliseconds.
        waited_ms: u64,
    },

    /// The extension reported failure for a `save_settings` push.
    #[error("Failed to save settings: {}", reason.as_deref().unwrap_or("Unknown error"))]
    SaveRejected {
        /// Reason reported by the extension, if any.
        reason: Option<String>,
    },
}

/// Share-link construction failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShareError {
    /// The current page URL could not be parsed.
    #[error("Invalid page URL '{url}': {reason}")]
    InvalidPageUrl {
        /// URL as given by the host.
        url: String,
        /// Parser message.
        reason: String,
    },
}

/// Export planning failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExportError {
    /// Download requested while no SVG is displayed.
    #[error("No diagram to download")]
    NoDiagram,

    /// Copy requested while no SVG is displayed.
    #[error("No diagram to copy")]
    NoDiagramToCopy,

    /// The displayed SVG has no measurable size yet.
    #[error("Diagram has no size yet")]
    Unmeasured,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn decode_error_display_mentions_cause() {
        let err = DecodeError::MalformedSnapshot("expected value at line 1".to_string());
        let msg = err.to_string();
        assert!(msg.contains("Malformed snapshot"));
        assert!(msg.contains("line 1"));
    }

    #[test]
    fn render_error_displays_message_verbatim() {
        let err = RenderError::new("Parse error on line 2");
        assert_eq!(err.to_string(), "Parse error on line 2");
    }

    #[test]
    fn save_rejected_with_reason() {
        let err = BridgeError::SaveRejected {
            reason: Some("quota exceeded".to_string()),
        };
        assert_eq!(err.to_string(), "Failed to save settings: quota exceeded");
    }

    #[test]
    fn save_rejected_without_reason_uses_generic_text() {
        let err = BridgeError::SaveRejected { reason: None };
        assert_eq!(err.to_string(), "Failed to save settings: Unknown error");
    }

    #[test]
    fn timeout_display_includes_duration() {
        let err = BridgeError::Timeout { waited_ms: 2000 };
        assert!(err.to_string().contains("2000ms"));
    }

    #[test]
    fn storage_io_error_keeps_path() {
        let err = StorageError::Io {
            path: PathBuf::from("/tmp/storage.json"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        };
        let msg = err.to_string();
        assert!(msg.contains("/tmp/storage.json"));
        assert!(msg.contains("denied"));
    }

    #[test]
    fn app_error_from_decode_error() {
        let app_err: AppError = DecodeError::InvalidUtf8.into();
        let msg = app_err.to_string();
        assert!(msg.contains("Decode error"));
        assert!(msg.contains("UTF-8"));
    }

    #[test]
    fn app_error_from_export_error() {
        let app_err: AppError = ExportError::NoDiagram.into();
        assert!(app_err.to_string().contains("No diagram to download"));
    }

    #[test]
    fn app_error_from_bridge_error() {
        let app_err: AppError = BridgeError::Timeout { waited_ms: 10 }.into();
        assert!(app_err.to_string().starts_with("Extension bridge error"));
    }
}
