//! Keyboard bindings configuration.

use super::loader::ConfigError;
use crate::model::ViewAction;
use std::collections::HashMap;

/// Maps key names (as reported by `KeyboardEvent.key`) to preview actions.
///
/// Provides default bindings with option to override via the
/// `[keybindings]` table:
///
/// ```toml
/// [keybindings]
/// zoom_in = ["+", "="]
/// fit_to_view = "F"
/// ```
///
/// Listing an action replaces all of its default keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyBindings {
    bindings: HashMap<String, ViewAction>,
}

impl KeyBindings {
    /// Look up the action for a key name.
    pub fn get(&self, key: &str) -> Option<ViewAction> {
        self.bindings.get(key).copied()
    }

    /// Keys bound to `action`, sorted.
    pub fn keys_for(&self, action: ViewAction) -> Vec<&str> {
        let mut keys: Vec<&str> = self
            .bindings
            .iter()
            .filter(|(_, bound)| **bound == action)
            .map(|(key, _)| key.as_str())
            .collect();
        keys.sort_unstable();
        keys
    }

    /// Defaults with the actions listed in `table` rebound.
    ///
    /// # Errors
    ///
    /// Unknown action names, values that are not a string or an array of
    /// strings, and empty key names are rejected.
    pub fn from_table(table: &toml::Table) -> Result<Self, ConfigError> {
        let mut bindings = Self::default();

        for (name, value) in table {
            let action = ViewAction::from_config_name(name).ok_or_else(|| {
                ConfigError::InvalidValue {
                    field: "keybindings",
                    reason: format!("unknown action '{name}'"),
                }
            })?;
            let keys = key_list(name, value)?;

            bindings.bindings.retain(|_, bound| *bound != action);
            for key in keys {
                bindings.bindings.insert(key, action);
            }
        }

        Ok(bindings)
    }
}

impl Default for KeyBindings {
    fn default() -> Self {
        let mut bindings = HashMap::new();

        bindings.insert("+".to_string(), ViewAction::ZoomIn);
        bindings.insert("=".to_string(), ViewAction::ZoomIn);
        bindings.insert("-".to_string(), ViewAction::ZoomOut);
        bindings.insert("_".to_string(), ViewAction::ZoomOut);
        bindings.insert("0".to_string(), ViewAction::ResetView);
        bindings.insert("f".to_string(), ViewAction::FitToView);

        Self { bindings }
    }
}

fn key_list(action: &str, value: &toml::Value) -> Result<Vec<String>, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidValue {
        field: "keybindings",
        reason,
    };

    let keys: Vec<String> = match value {
        toml::Value::String(key) => vec![key.clone()],
        toml::Value::Array(items) => items
            .iter()
            .map(|item| {
                item.as_str()
                    .map(str::to_string)
                    .ok_or_else(|| invalid(format!("'{action}' keys must be strings")))
            })
            .collect::<Result<_, _>>()?,
        _ => {
            return Err(invalid(format!(
                "'{action}' must be a key or a list of keys"
            )))
        }
    };

    if keys.iter().any(String::is_empty) {
        return Err(invalid(format!("'{action}' has an empty key name")));
    }
    Ok(keys)
}
