//! The editor document: the single source of truth for what to render.

use super::templates;
use super::theme::ThemeId;

/// Markup, template selection and theme of the editor.
///
/// `timestamp` is the wall-clock time of the last mutation in unix
/// milliseconds. It travels with persisted snapshots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorDocument {
    /// Diagram source.
    pub markup_text: String,
    /// Index into [`super::templates::TEMPLATES`] of the last picked template.
    pub selected_template_index: usize,
    /// Theme passed to the renderer.
    pub theme_id: ThemeId,
    /// Unix milliseconds of the last mutation.
    pub timestamp: i64,
}

impl EditorDocument {
    /// Document seeded from the template at `index`.
    ///
    /// Falls back to template 0 when the index is out of range.
    pub fn from_template(index: usize, timestamp: i64) -> Self {
        let (index, template) = match templates::get(index) {
            Some(t) => (index, t),
            None => (0, &templates::TEMPLATES[0]),
        };
        Self {
            markup_text: template.code.to_string(),
            selected_template_index: index,
            theme_id: ThemeId::Default,
            timestamp,
        }
    }

    /// Replace the markup. Returns `false` when nothing changed.
    pub fn set_markup(&mut self, markup: impl Into<String>, timestamp: i64) -> bool {
        let markup = markup.into();
        if markup == self.markup_text {
            return false;
        }
        self.markup_text = markup;
        self.timestamp = timestamp;
        true
    }

    /// Load the template at `index`, replacing the markup.
    ///
    /// Returns `false` for an unknown index, leaving the document untouched.
    pub fn select_template(&mut self, index: usize, timestamp: i64) -> bool {
        let Some(template) = templates::get(index) else {
            return false;
        };
        self.selected_template_index = index;
        self.markup_text = template.code.to_string();
        self.timestamp = timestamp;
        true
    }

    /// Switch theme. Returns `false` when the theme is already active.
    pub fn set_theme(&mut self, theme: ThemeId, timestamp: i64) -> bool {
        if theme == self.theme_id {
            return false;
        }
        self.theme_id = theme;
        self.timestamp = timestamp;
        true
    }
}

impl Default for EditorDocument {
    fn default() -> Self {
        Self::from_template(0, 0)
    }
}

/// Current wall-clock time in unix milliseconds.
pub fn wall_clock_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
