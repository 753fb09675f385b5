//! Configuration module.
//!
//! TOML file plus environment and host overrides, resolved into one
//! [`ResolvedConfig`] before a session is mounted.

pub mod keybindings;
pub mod loader;

pub use keybindings::KeyBindings;
pub use loader::{
    AutoFit, ConfigError, ConfigFile, ConfigOverrides, ResolvedConfig, apply_env_overrides,
    apply_overrides, default_config_path, default_log_path, default_storage_path,
    load_config_file, load_config_with_precedence, merge_config, resolve_config,
};
