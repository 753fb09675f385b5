//! Initial document resolution.
//!
//! # Markup precedence
//!
//! 1. `d` query parameter (base64 markup from a share link)
//! 2. `code` query parameter (raw markup)
//! 3. persisted snapshot
//! 4. template 0
//!
//! An empty `d` or `code` counts as absent. A non-empty `d` that fails to
//! decode, or decodes to nothing, opens template 0: it still claims the load,
//! so neither `code` nor the snapshot apply. The persisted snapshot's template
//! index and theme are only restored when no URL parameter is present.
//!
//! # Theme precedence
//!
//! A valid `theme` parameter wins and opens a share claim that the extension
//! bridge later confirms or revokes. Otherwise a restored non-default theme
//! is used. Anything else leaves the theme open to the extension.

use super::codec;
use crate::model::{EditorDocument, ThemeId, ThemeSource};
use tracing::{debug, warn};
use url::form_urlencoded;

/// The query parameters the editor understands. First occurrence wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    /// Base64 markup from a share link.
    pub d: Option<String>,
    /// Plain markup.
    pub code: Option<String>,
    /// Theme identifier, validated by [`QueryParams::valid_theme`].
    pub theme: Option<String>,
}

impl QueryParams {
    /// Parse a query string, with or without the leading `?`.
    pub fn parse(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        let mut params = Self::default();
        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            let slot = match key.as_ref() {
                "d" => &mut params.d,
                "code" => &mut params.code,
                "theme" => &mut params.theme,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value.into_owned());
            }
        }
        params
    }

    /// The `theme` parameter, if it names a built-in theme.
    pub fn valid_theme(&self) -> Option<ThemeId> {
        let raw = self.theme.as_deref()?;
        match raw.parse() {
            Ok(theme) => Some(theme),
            Err(e) => {
                debug!(error = %e, "Ignoring theme parameter");
                None
            }
        }
    }
}

/// Where the initial markup came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkupSource {
    /// Decoded from the `d` parameter.
    ShareLink,
    /// Taken from the `code` parameter.
    CodeParam,
    /// Restored from the stored snapshot.
    Persisted,
    /// The first template.
    Template,
}

/// Outcome of load resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitialState {
    /// Document to open.
    pub document: EditorDocument,
    /// Where its markup came from.
    pub markup_source: MarkupSource,
    /// Where its theme came from.
    pub theme_source: ThemeSource,
    /// Theme from the `theme` parameter awaiting plan authorization.
    pub share_claim: Option<ThemeId>,
}

/// Resolve the starting document from the URL query and the raw persisted
/// snapshot. `now_ms` stamps documents that did not come from storage.
pub fn resolve_initial(query: &QueryParams, persisted: Option<&str>, now_ms: i64) -> InitialState {
    let share_markup = query
        .d
        .as_deref()
        .filter(|encoded| !encoded.is_empty())
        .map(|encoded| match codec::decode_text(encoded) {
            Ok(markup) if !markup.is_empty() => Some(markup),
            Ok(_) => {
                debug!("Share link markup is empty");
                None
            }
            Err(e) => {
                warn!(error = %e, "Share link markup could not be decoded");
                None
            }
        });

    let (mut document, markup_source) = match share_markup {
        Some(Some(markup)) => (from_url(markup, now_ms), MarkupSource::ShareLink),
        Some(None) => (EditorDocument::from_template(0, now_ms), MarkupSource::Template),
        None => match query.code.clone().filter(|code| !code.is_empty()) {
            Some(code) => (from_url(code, now_ms), MarkupSource::CodeParam),
            None => match persisted.map(codec::deserialize) {
                Some(Ok(doc)) => (doc, MarkupSource::Persisted),
                Some(Err(e)) => {
                    warn!(error = %e, "Ignoring unreadable persisted snapshot");
                    (EditorDocument::from_template(0, now_ms), MarkupSource::Template)
                }
                None => (EditorDocument::from_template(0, now_ms), MarkupSource::Template),
            },
        },
    };

    let (theme_source, share_claim) = match query.valid_theme() {
        Some(theme) => {
            document.theme_id = theme;
            (ThemeSource::ShareLink, Some(theme))
        }
        None if markup_source == MarkupSource::Persisted && !document.theme_id.is_default() => {
            (ThemeSource::Persisted, None)
        }
        None => {
            document.theme_id = ThemeId::Default;
            (ThemeSource::Default, None)
        }
    };

    debug!(
        ?markup_source,
        ?theme_source,
        theme = %document.theme_id,
        "Initial document resolved"
    );

    InitialState {
        document,
        markup_source,
        theme_source,
        share_claim,
    }
}

fn from_url(markup: String, now_ms: i64) -> EditorDocument {
    let mut doc = EditorDocument::from_template(0, now_ms);
    doc.markup_text = markup;
    doc
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::templates;

    const NOW: i64 = 1_700_000_000_000;

    fn persisted(markup: &str, template: usize, theme: ThemeId) -> String {
        codec::serialize(&EditorDocument {
            markup_text: markup.to_string(),
            selected_template_index: template,
            theme_id: theme,
            timestamp: 7,
        })
    }

    #[test]
    fn parse_accepts_leading_question_mark_and_keeps_first() {
        let q = QueryParams::parse("?theme=dark&theme=forest&code=graph%20TD&x=1");
        assert_eq!(q.theme.as_deref(), Some("dark"));
        assert_eq!(q.code.as_deref(), Some("graph TD"));
        assert_eq!(q.d, None);
    }

    #[test]
    fn parse_form_decodes_plus_as_space() {
        let q = QueryParams::parse("d=QT4+");
        assert_eq!(q.d.as_deref(), Some("QT4 "));
        assert_eq!(codec::decode_text(q.d.as_deref().unwrap_or_default()).as_deref(), Ok("A>>"));
    }

    #[test]
    fn nothing_available_uses_first_template() {
        let state = resolve_initial(&QueryParams::default(), None, NOW);
        assert_eq!(state.markup_source, MarkupSource::Template);
        assert_eq!(state.document.markup_text, templates::TEMPLATES[0].code);
        assert_eq!(state.document.timestamp, NOW);
        assert_eq!(state.theme_source, ThemeSource::Default);
        assert_eq!(state.share_claim, None);
    }

    #[test]
    fn persisted_snapshot_restores_exactly() {
        let raw = persisted("flowchart TD\nA-->B", 2, ThemeId::Forest);
        let state = resolve_initial(&QueryParams::default(), Some(&raw), NOW);

        assert_eq!(state.markup_source, MarkupSource::Persisted);
        assert_eq!(state.document.markup_text, "flowchart TD\nA-->B");
        assert_eq!(state.document.selected_template_index, 2);
        assert_eq!(state.document.theme_id, ThemeId::Forest);
        assert_eq!(state.theme_source, ThemeSource::Persisted);
    }

    #[test]
    fn persisted_default_theme_stays_open_to_extension() {
        let raw = persisted("pie", 0, ThemeId::Default);
        let state = resolve_initial(&QueryParams::default(), Some(&raw), NOW);
        assert_eq!(state.theme_source, ThemeSource::Default);
    }

    #[test]
    fn share_link_beats_code_and_persisted() {
        let query = QueryParams {
            d: Some(codec::encode_text("graph LR\nX-->Y")),
            code: Some("ignored".to_string()),
            theme: Some("dark".to_string()),
        };
        let raw = persisted("persisted", 3, ThemeId::Forest);

        let state = resolve_initial(&query, Some(&raw), NOW);

        assert_eq!(state.markup_source, MarkupSource::ShareLink);
        assert_eq!(state.document.markup_text, "graph LR\nX-->Y");
        assert_eq!(state.document.selected_template_index, 0);
        assert_eq!(state.document.theme_id, ThemeId::Dark);
        assert_eq!(state.theme_source, ThemeSource::ShareLink);
        assert_eq!(state.share_claim, Some(ThemeId::Dark));
    }

    #[test]
    fn undecodable_share_link_opens_first_template_over_code() {
        let query = QueryParams::parse("?d=!!&code=graph%20TD");
        let state = resolve_initial(&query, None, NOW);
        assert_eq!(state.markup_source, MarkupSource::Template);
        assert_eq!(state.document.markup_text, templates::TEMPLATES[0].code);
    }

    #[test]
    fn undecodable_share_link_skips_persisted_snapshot() {
        let query = QueryParams::parse("?d=!!");
        let raw = persisted("kept", 1, ThemeId::Neutral);
        let state = resolve_initial(&query, Some(&raw), NOW);
        assert_eq!(state.markup_source, MarkupSource::Template);
        assert_eq!(state.document.markup_text, templates::TEMPLATES[0].code);
        assert_eq!(state.document.theme_id, ThemeId::Default);
    }

    #[test]
    fn share_link_decoding_to_nothing_opens_first_template() {
        let query = QueryParams {
            d: Some("\n".to_string()),
            ..QueryParams::default()
        };
        let raw = persisted("kept", 1, ThemeId::Neutral);
        let state = resolve_initial(&query, Some(&raw), NOW);
        assert_eq!(state.markup_source, MarkupSource::Template);
        assert_eq!(state.document.markup_text, templates::TEMPLATES[0].code);
    }

    #[test]
    fn empty_share_param_keeps_persisted_snapshot() {
        let raw = persisted("kept", 1, ThemeId::Neutral);
        let state = resolve_initial(&QueryParams::parse("?d="), Some(&raw), NOW);
        assert_eq!(state.markup_source, MarkupSource::Persisted);
        assert_eq!(state.document.markup_text, "kept");
        assert_eq!(state.document.theme_id, ThemeId::Neutral);
    }

    #[test]
    fn empty_share_param_defers_to_code() {
        let state = resolve_initial(&QueryParams::parse("d=&code=pie"), None, NOW);
        assert_eq!(state.markup_source, MarkupSource::CodeParam);
        assert_eq!(state.document.markup_text, "pie");
    }

    #[test]
    fn unpadded_share_link_decodes() {
        let state = resolve_initial(&QueryParams::parse("?d=QQ"), None, NOW);
        assert_eq!(state.markup_source, MarkupSource::ShareLink);
        assert_eq!(state.document.markup_text, "A");
    }

    #[test]
    fn invalid_theme_param_is_ignored() {
        let query = QueryParams {
            theme: Some("custom:ocean".to_string()),
            ..QueryParams::default()
        };
        let raw = persisted("kept", 0, ThemeId::Base);
        let state = resolve_initial(&query, Some(&raw), NOW);
        assert_eq!(state.document.theme_id, ThemeId::Base);
        assert_eq!(state.share_claim, None);
    }

    #[test]
    fn code_param_ignores_persisted_theme() {
        let query = QueryParams {
            code: Some("graph TD".to_string()),
            ..QueryParams::default()
        };
        let raw = persisted("persisted", 0, ThemeId::Dark);
        let state = resolve_initial(&query, Some(&raw), NOW);
        assert_eq!(state.document.theme_id, ThemeId::Default);
        assert_eq!(state.theme_source, ThemeSource::Default);
    }

    #[test]
    fn corrupt_snapshot_falls_back_to_template() {
        let state = resolve_initial(&QueryParams::default(), Some("{broken"), NOW);
        assert_eq!(state.markup_source, MarkupSource::Template);
    }
}
