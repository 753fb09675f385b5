//! Domain model types (pure).
//!
//! All types in this module are pure data with smart constructors.

pub mod document;
pub mod error;
pub mod geometry;
pub mod notification;
pub mod templates;
pub mod theme;
pub mod view_action;

// Re-export for convenience
pub use document::EditorDocument;
pub use error::{
    AppError, BridgeError, DecodeError, ExportError, RenderError, ShareError, StorageError,
};
pub use geometry::{Point, Rect, Size};
pub use notification::{Notification, NotificationLevel};
pub use templates::Template;
pub use theme::{PlanTier, ThemeId, ThemeSource, UnknownTheme};
pub use view_action::ViewAction;
