//! Diagram themes and plan tiers.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Built-in diagram theme understood by the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeId {
    /// The renderer's default palette. Free on every plan.
    #[default]
    Default,
    /// Dark background.
    Dark,
    /// Greens.
    Forest,
    /// Greys.
    Neutral,
    /// Neutral base for customization.
    Base,
}

impl ThemeId {
    /// All themes in display order.
    pub const ALL: [ThemeId; 5] = [
        ThemeId::Default,
        ThemeId::Dark,
        ThemeId::Forest,
        ThemeId::Neutral,
        ThemeId::Base,
    ];

    /// Wire/query identifier (`"default"`, `"dark"`, ...).
    pub fn as_str(&self) -> &'static str {
        match self {
            ThemeId::Default => "default",
            ThemeId::Dark => "dark",
            ThemeId::Forest => "forest",
            ThemeId::Neutral => "neutral",
            ThemeId::Base => "base",
        }
    }

    /// Human-readable name shown in the theme panel.
    pub fn display_name(&self) -> &'static str {
        match self {
            ThemeId::Default => "Default",
            ThemeId::Dark => "Dark",
            ThemeId::Forest => "Forest",
            ThemeId::Neutral => "Neutral",
            ThemeId::Base => "Base",
        }
    }

    /// Whether this is [`ThemeId::Default`].
    pub fn is_default(&self) -> bool {
        matches!(self, ThemeId::Default)
    }

    /// Whether a user on `plan` may use this theme.
    ///
    /// The default theme is free; every other built-in theme needs Pro.
    pub fn is_authorized_for(&self, plan: PlanTier) -> bool {
        self.is_default() || plan == PlanTier::Pro
    }
}

impl fmt::Display for ThemeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for theme identifiers outside the built-in set.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown theme '{0}'")]
pub struct UnknownTheme(pub String);

impl FromStr for ThemeId {
    type Err = UnknownTheme;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ThemeId::ALL
            .into_iter()
            .find(|theme| theme.as_str() == s)
            .ok_or_else(|| UnknownTheme(s.to_string()))
    }
}

/// Entitlement level reported by the extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanTier {
    /// No paid themes.
    #[default]
    Free,
    /// All themes.
    Pro,
}

impl PlanTier {
    /// Wire identifier (`"free"` or `"pro"`).
    pub fn as_str(&self) -> &'static str {
        match self {
            PlanTier::Free => "free",
            PlanTier::Pro => "pro",
        }
    }
}

impl fmt::Display for PlanTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where the document's current theme came from.
///
/// Used to enforce theme precedence: an extension-provided theme may only
/// replace a theme that came from the default or from the extension itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThemeSource {
    /// Nothing chose a theme.
    #[default]
    Default,
    /// Restored from the local snapshot.
    Persisted,
    /// The `theme` parameter of a share link.
    ShareLink,
    /// Reported by the extension.
    Extension,
    /// Picked by the user.
    User,
}

impl ThemeSource {
    /// Whether a theme reported by the extension may replace a theme from this source.
    pub fn yields_to_extension(&self) -> bool {
        matches!(self, ThemeSource::Default | ThemeSource::Extension)
    }
}
