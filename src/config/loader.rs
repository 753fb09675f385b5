//! Configuration file loading with precedence handling.

use super::keybindings::KeyBindings;
use crate::viewport::ScaleBounds;
use serde::Deserialize;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;
use tracing::Level;

/// Errors that can occur during config loading.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Failed to read config file (permission issues, not a file, ...).
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError {
        /// Path that failed to read.
        path: PathBuf,
        /// Reason for failure.
        reason: String,
    },

    /// Config file contains invalid TOML syntax or unknown fields.
    #[error("Invalid TOML in {path}: {reason}")]
    ParseError {
        /// Path with invalid TOML.
        path: PathBuf,
        /// Parse error details.
        reason: String,
    },

    /// A field parsed but its value is out of range.
    #[error("Invalid value for {field}: {reason}")]
    InvalidValue {
        /// Config field name.
        field: &'static str,
        /// What is wrong with it.
        reason: String,
    },
}

/// What the preview does when new content has been measured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AutoFit {
    /// Scale 1.0, content centered.
    #[default]
    Center,
    /// Scale the content to fit the stage.
    Fit,
}

impl AutoFit {
    /// Name used in config files and `FLOWPREVIEW_AUTO_FIT`.
    pub fn as_str(&self) -> &'static str {
        match self {
            AutoFit::Center => "center",
            AutoFit::Fit => "fit",
        }
    }
}

impl fmt::Display for AutoFit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AutoFit {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "center" => Ok(AutoFit::Center),
            "fit" => Ok(AutoFit::Fit),
            other => Err(ConfigError::InvalidValue {
                field: "auto_fit",
                reason: format!("expected 'center' or 'fit', got '{other}'"),
            }),
        }
    }
}

/// TOML configuration file structure.
///
/// All fields are optional - if not specified, hardcoded defaults are used.
/// Corresponds to `~/.config/flowpreview/config.toml`.
#[derive(Debug, Clone, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    /// Quiet window before an edit is rendered.
    #[serde(default)]
    pub render_debounce_ms: Option<u64>,

    /// Quiet window before a snapshot is written.
    #[serde(default)]
    pub snapshot_debounce_ms: Option<u64>,

    /// How long to wait for the extension to answer `page_ready`.
    #[serde(default)]
    pub bridge_timeout_ms: Option<u64>,

    /// Lowest zoom scale.
    #[serde(default)]
    pub min_scale: Option<f64>,

    /// Highest zoom scale.
    #[serde(default)]
    pub max_scale: Option<f64>,

    /// Margin kept around fitted content, in pixels.
    #[serde(default)]
    pub fit_padding_px: Option<f64>,

    /// Factor of one toolbar or keyboard zoom step.
    #[serde(default)]
    pub zoom_step: Option<f64>,

    /// Viewport policy when new content has been measured.
    #[serde(default)]
    pub auto_fit: Option<AutoFit>,

    /// Backing file of the native key-value store.
    #[serde(default)]
    pub storage_path: Option<PathBuf>,

    /// Path to log file for tracing output.
    #[serde(default)]
    pub log_file_path: Option<PathBuf>,

    /// Default tracing level when `RUST_LOG` is unset.
    #[serde(default)]
    pub log_level: Option<String>,

    /// Action name to key (or list of keys).
    #[serde(default)]
    pub keybindings: Option<toml::Table>,
}

/// Resolved configuration after applying precedence rules.
///
/// Created by merging defaults, config file, env vars, and host overrides.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    /// Render debounce window.
    pub render_debounce_ms: u64,
    /// Snapshot debounce window.
    pub snapshot_debounce_ms: u64,
    /// Extension connection timeout.
    pub bridge_timeout_ms: u64,
    /// Validated zoom range.
    pub scale_bounds: ScaleBounds,
    /// Fit padding in pixels.
    pub fit_padding_px: f64,
    /// Toolbar/keyboard zoom factor.
    pub zoom_step: f64,
    /// Auto-fit policy.
    pub auto_fit: AutoFit,
    /// Backing file of the native key-value store.
    pub storage_path: PathBuf,
    /// Path to log file for tracing output.
    pub log_file_path: PathBuf,
    /// Default tracing level.
    pub log_level: Level,
    /// Preview key bindings.
    pub keybindings: KeyBindings,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            render_debounce_ms: 120,
            snapshot_debounce_ms: 250,
            bridge_timeout_ms: 2000,
            scale_bounds: ScaleBounds::DEFAULT,
            fit_padding_px: 24.0,
            zoom_step: 1.2,
            auto_fit: AutoFit::Center,
            storage_path: default_storage_path(),
            log_file_path: default_log_path(),
            log_level: Level::INFO,
            keybindings: KeyBindings::default(),
        }
    }
}

/// Host-supplied overrides. Highest precedence.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigOverrides {
    /// Layout applied after each successful render.
    pub auto_fit: Option<AutoFit>,
    /// Maximum log level.
    pub log_level: Option<Level>,
    /// Snapshot store file.
    pub storage_path: Option<PathBuf>,
    /// Log file.
    pub log_file_path: Option<PathBuf>,
}

/// Resolve default log file path.
///
/// Returns `~/.local/state/flowpreview/flowpreview.log` on Linux, or the
/// platform equivalent. Falls back to the current directory.
pub fn default_log_path() -> PathBuf {
    match dirs::state_dir() {
        Some(state_dir) => state_dir.join("flowpreview").join("flowpreview.log"),
        None => PathBuf::from("flowpreview.log"),
    }
}

/// Resolve default storage file path.
///
/// Returns `~/.local/share/flowpreview/storage.json` on Linux, or the
/// platform equivalent. Falls back to the current directory.
pub fn default_storage_path() -> PathBuf {
    match dirs::data_dir() {
        Some(data_dir) => data_dir.join("flowpreview").join("storage.json"),
        None => PathBuf::from("flowpreview-storage.json"),
    }
}

/// Resolve default config file path.
///
/// Returns `~/.config/flowpreview/config.toml` on Linux, appropriate path on
/// other platforms. Returns `None` if home directory cannot be determined.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("flowpreview").join("config.toml"))
}

/// Load configuration file from a specific path.
///
/// Returns `Ok(None)` if file doesn't exist (not an error - use defaults).
///
/// # Errors
///
/// Returns error if file exists but has read or parse errors.
pub fn load_config_file(path: impl Into<PathBuf>) -> Result<Option<ConfigFile>, ConfigError> {
    let path = path.into();

    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path).map_err(|e| ConfigError::ReadError {
        path: path.clone(),
        reason: e.to_string(),
    })?;

    let config: ConfigFile = toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
        path: path.clone(),
        reason: e.to_string(),
    })?;

    Ok(Some(config))
}

/// Load configuration with precedence handling.
///
/// Precedence (highest to lowest):
/// 1. Explicit `config_path` argument
/// 2. `FLOWPREVIEW_CONFIG` environment variable
/// 3. Default path `~/.config/flowpreview/config.toml`
///
/// Missing config files are NOT errors - defaults are used.
///
/// # Errors
///
/// Returns error only if a config file exists but cannot be read or parsed.
pub fn load_config_with_precedence(
    config_path: Option<PathBuf>,
) -> Result<Option<ConfigFile>, ConfigError> {
    if let Some(path) = config_path {
        return load_config_file(path);
    }

    if let Ok(env_path) = std::env::var("FLOWPREVIEW_CONFIG") {
        return load_config_file(PathBuf::from(env_path));
    }

    if let Some(default_path) = default_config_path() {
        return load_config_file(default_path);
    }

    Ok(None)
}

/// Merge config file into defaults to create resolved config.
///
/// For each field in `ConfigFile`, if `Some(value)`, use it; otherwise use
/// default. Every value is validated.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidValue`] for out-of-range numbers, an
/// unknown log level or a malformed `[keybindings]` table.
pub fn merge_config(config_file: Option<ConfigFile>) -> Result<ResolvedConfig, ConfigError> {
    let defaults = ResolvedConfig::default();

    let Some(config) = config_file else {
        return Ok(defaults);
    };

    let scale_bounds = ScaleBounds::new(
        config.min_scale.unwrap_or(defaults.scale_bounds.min()),
        config.max_scale.unwrap_or(defaults.scale_bounds.max()),
    )
    .map_err(|e| ConfigError::InvalidValue {
        field: "min_scale/max_scale",
        reason: e.to_string(),
    })?;

    let fit_padding_px = config.fit_padding_px.unwrap_or(defaults.fit_padding_px);
    if !fit_padding_px.is_finite() || fit_padding_px < 0.0 {
        return Err(ConfigError::InvalidValue {
            field: "fit_padding_px",
            reason: format!("must be a non-negative number, got {fit_padding_px}"),
        });
    }

    let zoom_step = config.zoom_step.unwrap_or(defaults.zoom_step);
    if !zoom_step.is_finite() || zoom_step <= 0.0 {
        return Err(ConfigError::InvalidValue {
            field: "zoom_step",
            reason: format!("must be a positive number, got {zoom_step}"),
        });
    }

    let log_level = match config.log_level {
        Some(raw) => parse_level(&raw)?,
        None => defaults.log_level,
    };

    let keybindings = match config.keybindings {
        Some(table) => KeyBindings::from_table(&table)?,
        None => defaults.keybindings,
    };

    Ok(ResolvedConfig {
        render_debounce_ms: config
            .render_debounce_ms
            .unwrap_or(defaults.render_debounce_ms),
        snapshot_debounce_ms: config
            .snapshot_debounce_ms
            .unwrap_or(defaults.snapshot_debounce_ms),
        bridge_timeout_ms: config
            .bridge_timeout_ms
            .unwrap_or(defaults.bridge_timeout_ms),
        scale_bounds,
        fit_padding_px,
        zoom_step,
        auto_fit: config.auto_fit.unwrap_or(defaults.auto_fit),
        storage_path: config.storage_path.unwrap_or(defaults.storage_path),
        log_file_path: config.log_file_path.unwrap_or(defaults.log_file_path),
        log_level,
        keybindings,
    })
}

/// Apply environment variable overrides to resolved config.
///
/// Checks for:
/// - `FLOWPREVIEW_LOG_FILE`: Override log file path
/// - `FLOWPREVIEW_AUTO_FIT`: Override auto-fit policy (`center` or `fit`)
///
/// # Errors
///
/// Returns error if `FLOWPREVIEW_AUTO_FIT` holds an unknown policy.
pub fn apply_env_overrides(mut config: ResolvedConfig) -> Result<ResolvedConfig, ConfigError> {
    if let Ok(path) = std::env::var("FLOWPREVIEW_LOG_FILE") {
        config.log_file_path = PathBuf::from(path);
    }

    if let Ok(policy) = std::env::var("FLOWPREVIEW_AUTO_FIT") {
        config.auto_fit = policy.parse()?;
    }

    Ok(config)
}

/// Apply host overrides to resolved config.
///
/// Precedence chain: Defaults → Config File → Env Vars → Host (highest)
pub fn apply_overrides(mut config: ResolvedConfig, overrides: ConfigOverrides) -> ResolvedConfig {
    if let Some(auto_fit) = overrides.auto_fit {
        config.auto_fit = auto_fit;
    }

    if let Some(level) = overrides.log_level {
        config.log_level = level;
    }

    if let Some(path) = overrides.storage_path {
        config.storage_path = path;
    }

    if let Some(path) = overrides.log_file_path {
        config.log_file_path = path;
    }

    config
}

/// Run the whole chain: locate and load the file, merge, env, overrides.
///
/// # Errors
///
/// Any read, parse or validation failure along the chain.
pub fn resolve_config(
    config_path: Option<PathBuf>,
    overrides: ConfigOverrides,
) -> Result<ResolvedConfig, ConfigError> {
    let file = load_config_with_precedence(config_path)?;
    let merged = merge_config(file)?;
    let with_env = apply_env_overrides(merged)?;
    Ok(apply_overrides(with_env, overrides))
}

fn parse_level(raw: &str) -> Result<Level, ConfigError> {
    raw.parse().map_err(|_| ConfigError::InvalidValue {
        field: "log_level",
        reason: format!("unknown level '{raw}'"),
    })
}

#[cfg(test)]
#[path = "loader_tests.rs"]
mod tests;
