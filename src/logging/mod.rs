//! Tracing subscriber initialization.
//!
//! The core only emits `tracing` events. Native hosts call [`init`] once at
//! start-up to write them to a file; browser hosts usually install their own
//! subscriber instead.

use crate::config::ResolvedConfig;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::Level;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

/// Error type for logging initialization failures.
#[derive(Debug, Error)]
pub enum LoggingError {
    /// Failed to create log directory
    #[error("Failed to create log directory at {path:?}: {source}")]
    DirectoryCreation {
        /// The directory path that failed to be created
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Invalid log file path (no filename component)
    #[error("Invalid log file path: {0:?}")]
    InvalidPath(PathBuf),

    /// Tracing subscriber already initialized
    #[error("Tracing subscriber already initialized")]
    SubscriberAlreadySet,
}

/// Initialize the tracing subscriber with file-based logging.
///
/// `RUST_LOG` wins when set; otherwise events at `level` and above are
/// written. Creates the log directory if it doesn't exist.
///
/// # Errors
///
/// Fails if the directory cannot be created, the path has no file name, or
/// a global subscriber is already installed.
pub fn init(log_path: &Path, level: Level) -> Result<(), LoggingError> {
    let file_name = log_path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| LoggingError::InvalidPath(log_path.to_path_buf()))?;

    let directory = match log_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    std::fs::create_dir_all(&directory).map_err(|source| LoggingError::DirectoryCreation {
        path: directory.clone(),
        source,
    })?;

    let file_appender = tracing_appender::rolling::never(&directory, file_name);

    tracing_subscriber::fmt()
        .with_env_filter(env_filter(level))
        .with_writer(file_appender)
        .with_ansi(false)
        .try_init()
        .map_err(|_| LoggingError::SubscriberAlreadySet)
}

/// [`init`] with the log path and level from a resolved config.
///
/// # Errors
///
/// See [`init`].
pub fn init_from_config(config: &ResolvedConfig) -> Result<(), LoggingError> {
    init(&config.log_file_path, config.log_level)
}

/// `RUST_LOG` if set and valid, else `level`.
fn env_filter(level: Level) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(level).into())
        .from_env_lossy()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::fs;

    #[test]
    #[serial(tracing_init)]
    fn init_creates_log_directory_if_missing() {
        let test_dir = std::env::temp_dir().join("flowpreview_test_logs_create");
        let log_file = test_dir.join("test.log");
        let _ = fs::remove_dir_all(&test_dir);

        // May fail if another test already installed the subscriber.
        let _ = init(&log_file, Level::DEBUG);

        assert!(
            test_dir.exists(),
            "Log directory should be created: {:?}",
            test_dir
        );
        let _ = fs::remove_dir_all(&test_dir);
    }

    #[test]
    #[serial(tracing_init)]
    fn second_init_reports_subscriber_already_set() {
        let test_dir = std::env::temp_dir().join("flowpreview_test_logs_twice");
        let log_file = test_dir.join("twice.log");

        let _ = init(&log_file, Level::INFO);
        let second = init(&log_file, Level::INFO);

        assert!(matches!(second, Err(LoggingError::SubscriberAlreadySet)));
        let _ = fs::remove_dir_all(&test_dir);
    }

    #[test]
    fn path_without_file_name_is_rejected() {
        let err = init(Path::new("/"), Level::INFO).unwrap_err();
        assert!(matches!(err, LoggingError::InvalidPath(_)));
    }

    #[test]
    #[serial(tracing_init)]
    fn configured_level_applies_without_rust_log() {
        std::env::remove_var("RUST_LOG");
        let filter = env_filter(Level::WARN);
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::WARN));
    }
}
