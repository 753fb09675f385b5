//! Text and snapshot codecs.
//!
//! Two formats leave the editor:
//!
//! - markup text encoded as standard base64 over its UTF-8 bytes, used for
//!   the `d` share-link parameter
//! - the storage snapshot, a JSON object
//!   `{"code", "selectedTemplate", "diagramTheme", "_ts"}`

use crate::model::{DecodeError, EditorDocument, ShareError, ThemeId, templates};
use base64::Engine as _;
use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig, STANDARD};
use base64::engine::DecodePaddingMode;
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

/// Standard alphabet that accepts input with or without `=` padding and
/// non-zero trailing bits, like a browser's `atob`.
const LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_padding_mode(DecodePaddingMode::Indifferent)
        .with_decode_allow_trailing_bits(true),
);

/// Encode markup for embedding in a URL parameter.
pub fn encode_text(text: &str) -> String {
    STANDARD.encode(text.as_bytes())
}

/// Decode markup produced by [`encode_text`].
///
/// Form decoding of a query string turns an unescaped `+` into a space;
/// spaces are never part of standard base64, so they are mapped back. Other
/// ASCII whitespace (line breaks from copy and paste) is skipped and padding
/// is optional.
pub fn decode_text(encoded: &str) -> Result<String, DecodeError> {
    let restored: String = encoded
        .chars()
        .filter_map(|c| match c {
            ' ' => Some('+'),
            '\t' | '\n' | '\r' | '\x0c' => None,
            c => Some(c),
        })
        .collect();
    let bytes = LENIENT
        .decode(restored.as_bytes())
        .map_err(|e| DecodeError::InvalidEncoding(e.to_string()))?;
    String::from_utf8(bytes).map_err(|_| DecodeError::InvalidUtf8)
}

#[derive(Serialize)]
struct SnapshotOut<'a> {
    code: &'a str,
    #[serde(rename = "selectedTemplate")]
    selected_template: usize,
    #[serde(rename = "diagramTheme")]
    diagram_theme: ThemeId,
    #[serde(rename = "_ts")]
    timestamp: i64,
}

#[derive(Deserialize)]
struct SnapshotIn {
    #[serde(default)]
    code: Option<String>,
    #[serde(default, rename = "selectedTemplate")]
    selected_template: Option<serde_json::Value>,
    #[serde(default, rename = "diagramTheme")]
    diagram_theme: Option<String>,
    #[serde(default, rename = "_ts")]
    timestamp: Option<i64>,
}

/// Serialize a document to the storage snapshot JSON.
pub fn serialize(doc: &EditorDocument) -> String {
    let snapshot = SnapshotOut {
        code: &doc.markup_text,
        selected_template: doc.selected_template_index,
        diagram_theme: doc.theme_id,
        timestamp: doc.timestamp,
    };
    // A struct of strings and integers always serializes.
    serde_json::to_string(&snapshot).unwrap_or_default()
}

/// Parse a storage snapshot.
///
/// Only a payload that is not a JSON object is an error. Individual fields
/// fall back: a missing `code` takes the selected template's markup, an
/// unknown theme becomes `default`, a missing or out-of-range template index
/// becomes 0 and a missing timestamp becomes 0.
pub fn deserialize(raw: &str) -> Result<EditorDocument, DecodeError> {
    let snapshot: SnapshotIn =
        serde_json::from_str(raw).map_err(|e| DecodeError::MalformedSnapshot(e.to_string()))?;

    let selected_template_index = snapshot
        .selected_template
        .as_ref()
        .and_then(serde_json::Value::as_u64)
        .and_then(|i| usize::try_from(i).ok())
        .filter(|&i| templates::get(i).is_some())
        .unwrap_or(0);

    let theme_id = match snapshot.diagram_theme.as_deref() {
        Some(name) => name.parse().unwrap_or_else(|_| {
            debug!(theme = name, "Unknown persisted theme, using default");
            ThemeId::Default
        }),
        None => ThemeId::Default,
    };

    let markup_text = match snapshot.code {
        Some(code) => code,
        None => templates::TEMPLATES[selected_template_index].code.to_string(),
    };

    Ok(EditorDocument {
        markup_text,
        selected_template_index,
        theme_id,
        timestamp: snapshot.timestamp.unwrap_or(0),
    })
}

/// URL-embeddable projection of a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareLink {
    /// Base64 of the UTF-8 markup, as used in `d`.
    pub encoded_markup: String,
    /// Theme carried in `theme`.
    pub theme: ThemeId,
}

impl ShareLink {
    /// Encode the markup and theme of `doc`.
    pub fn from_document(doc: &EditorDocument) -> Self {
        Self {
            encoded_markup: encode_text(&doc.markup_text),
            theme: doc.theme_id,
        }
    }

    /// `page_url` with the `d` and `theme` parameters replaced by this link.
    ///
    /// Other query parameters and the fragment are preserved.
    pub fn apply_to(&self, page_url: &str) -> Result<String, ShareError> {
        let mut url = Url::parse(page_url).map_err(|e| ShareError::InvalidPageUrl {
            url: page_url.to_string(),
            reason: e.to_string(),
        })?;

        let retained: Vec<(String, String)> = url
            .query_pairs()
            .filter(|(key, _)| key != "d" && key != "theme")
            .map(|(key, value)| (key.into_owned(), value.into_owned()))
            .collect();

        url.query_pairs_mut()
            .clear()
            .extend_pairs(retained)
            .append_pair("d", &self.encoded_markup)
            .append_pair("theme", self.theme.as_str());

        Ok(url.into())
    }
}

/// Share link for `doc` based on the current page URL.
pub fn share_url(page_url: &str, doc: &EditorDocument) -> Result<String, ShareError> {
    ShareLink::from_document(doc).apply_to(page_url)
}
