//! Domain-level preview actions independent of key bindings.

/// Viewport actions triggered from the toolbar or the keyboard.
///
/// These represent user intent, not specific keys. The mapping from key
/// names to actions is handled by [`crate::config::KeyBindings`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewAction {
    /// Zoom in about the stage center. Default: `+` / `=`
    ZoomIn,
    /// Zoom out about the stage center. Default: `-` / `_`
    ZoomOut,
    /// Scale 1.0 with the content centered. Default: `0`
    ResetView,
    /// Scale the content to fit the stage. Default: `f`
    FitToView,
}

impl ViewAction {
    /// Config-file name of the action (`[keybindings]` table keys).
    pub fn config_name(&self) -> &'static str {
        match self {
            ViewAction::ZoomIn => "zoom_in",
            ViewAction::ZoomOut => "zoom_out",
            ViewAction::ResetView => "reset_view",
            ViewAction::FitToView => "fit_to_view",
        }
    }

    /// Inverse of [`ViewAction::config_name`].
    pub fn from_config_name(name: &str) -> Option<Self> {
        [
            ViewAction::ZoomIn,
            ViewAction::ZoomOut,
            ViewAction::ResetView,
            ViewAction::FitToView,
        ]
        .into_iter()
        .find(|action| action.config_name() == name)
    }
}
