//! Wire format of the page/extension message channel.
//!
//! Every message is a JSON envelope `{"source", "type", "data"?}`. The page
//! posts with source [`PAGE_SOURCE`] and only listens to
//! [`EXTENSION_SOURCE`]; since both ends share one channel the page also
//! sees its own posts and drops them by source.

use crate::model::{PlanTier, ThemeId};
use serde_json::{Map, Value, json};
use tracing::debug;

/// Source tag of messages posted by the editor page.
pub const PAGE_SOURCE: &str = "flow2chat_page";

/// Source tag of messages posted by the browser extension.
pub const EXTENSION_SOURCE: &str = "flow2chat_extension";

/// Messages the page sends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageMessage {
    /// Announces the page is listening.
    PageReady,
    /// Asks a connected extension for plan and theme.
    RequestSettings,
    /// Pushes the current plan and theme for the extension to store.
    SaveSettings {
        /// Plan the extension should record.
        plan: PlanTier,
        /// Theme the extension should record.
        theme: ThemeId,
        /// Echoed back in the matching `settings_saved` reply.
        request_id: u64,
    },
}

impl PageMessage {
    /// Value of the envelope's `type` field.
    pub fn message_type(&self) -> &'static str {
        match self {
            PageMessage::PageReady => "f2c_page_ready",
            PageMessage::RequestSettings => "f2c_request_settings",
            PageMessage::SaveSettings { .. } => "f2c_save_settings",
        }
    }

    /// JSON envelope ready for posting.
    pub fn to_value(&self) -> Value {
        let mut envelope = Map::new();
        envelope.insert("source".to_string(), Value::from(PAGE_SOURCE));
        envelope.insert("type".to_string(), Value::from(self.message_type()));
        if let PageMessage::SaveSettings {
            plan,
            theme,
            request_id,
        } = self
        {
            envelope.insert(
                "data".to_string(),
                json!({
                    "plan": plan.as_str(),
                    "theme": theme.as_str(),
                    "requestId": request_id,
                }),
            );
        }
        Value::Object(envelope)
    }
}

/// Messages the page reacts to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtensionMessage {
    /// The extension answered `page_ready`.
    Connected {
        /// Extension version, when reported.
        version: Option<String>,
    },
    /// Plan and preferred theme. Either field may be absent or unrecognized.
    SettingsUpdate {
        /// Reported plan, `None` when absent or unrecognized.
        plan: Option<PlanTier>,
        /// Preferred theme, `None` when absent or unrecognized.
        theme: Option<ThemeId>,
    },
    /// Answer to a `save_settings` push.
    SettingsSaved {
        /// Whether the extension stored the settings.
        success: bool,
        /// Failure reason, if the extension gave one.
        error: Option<String>,
        /// Id of the save being answered. Older extensions omit it.
        request_id: Option<u64>,
    },
}

impl ExtensionMessage {
    /// Parse an incoming envelope.
    ///
    /// Returns `None` for messages from any other source and for unknown
    /// types; the channel is shared with unrelated traffic.
    pub fn parse(value: &Value) -> Option<Self> {
        let envelope = value.as_object()?;
        if envelope.get("source").and_then(Value::as_str) != Some(EXTENSION_SOURCE) {
            return None;
        }
        let kind = envelope.get("type").and_then(Value::as_str)?;
        let data = envelope.get("data").unwrap_or(&Value::Null);
        let field = |name: &str| data.get(name).and_then(Value::as_str);

        match kind {
            "f2c_extension_connected" => Some(ExtensionMessage::Connected {
                version: field("version").map(str::to_string),
            }),
            "f2c_settings_update" => Some(ExtensionMessage::SettingsUpdate {
                plan: field("plan").and_then(parse_plan),
                theme: field("theme").and_then(|t| t.parse().ok()),
            }),
            "f2c_settings_saved" => Some(ExtensionMessage::SettingsSaved {
                success: data.get("success").and_then(Value::as_bool).unwrap_or(false),
                error: field("error").map(str::to_string),
                request_id: data.get("requestId").and_then(Value::as_u64),
            }),
            other => {
                debug!(message_type = other, "Ignoring unknown extension message");
                None
            }
        }
    }
}

fn parse_plan(raw: &str) -> Option<PlanTier> {
    match raw {
        "free" => Some(PlanTier::Free),
        "pro" => Some(PlanTier::Pro),
        _ => None,
    }
}
