//! Editor session state machine.
//!
//! [`EditorSession`] sequences every event through one `&mut self` path;
//! the view handler is a pure function over the viewport engine.

pub mod event;
pub mod session;
pub mod view_handler;

// Re-export for convenience
pub use event::{Effect, Event};
pub use session::EditorSession;
pub use view_handler::handle_view_action;
