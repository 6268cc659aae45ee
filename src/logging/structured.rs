//! Structured logging setup using tracing
//!
//! Console output is always on. When `logging.local_enabled` is set, the same
//! events are also written as JSON lines to a rolling file under
//! `logging.local_path`.

use crate::config::schema::{LoggingConfig, VALID_LOG_LEVELS};
use crate::domain::{AnonymizerError, Result};
use std::path::Path;
use tracing::Level;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// File name prefix of local log files
pub const LOG_FILE_NAME: &str = "polarion-anonymizer.log";

/// Keeps the background file writer alive; drop it last so buffered events
/// reach the disk
pub struct LoggingGuard {
    file_guard: Option<WorkerGuard>,
}

impl LoggingGuard {
    /// Whether a file writer is attached
    pub fn has_file_writer(&self) -> bool {
        self.file_guard.is_some()
    }
}

/// Install the global subscriber
///
/// `RUST_LOG` takes precedence over `level` when set. Fails with a
/// configuration error on an unknown level or rotation, an uncreatable log
/// directory, or when a subscriber is already installed.
///
/// # Example
///
/// ```no_run
/// use polarion_anonymizer::logging::init_logging;
/// use polarion_anonymizer::config::LoggingConfig;
///
/// let _guard = init_logging("debug", &LoggingConfig::default()).expect("logging");
/// tracing::debug!("visible");
/// ```
pub fn init_logging(level: &str, config: &LoggingConfig) -> Result<LoggingGuard> {
    let level = parse_log_level(level)?;
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("polarion_anonymizer={}", level)));

    let (file_writer, file_guard) = if config.local_enabled {
        let (writer, guard) = file_writer(config)?;
        (Some(writer), Some(guard))
    } else {
        (None, None)
    };

    let console_layer = tracing_subscriber::fmt::layer().with_target(false);
    let file_layer = file_writer.map(|writer| {
        tracing_subscriber::fmt::layer()
            .json()
            .with_thread_ids(true)
            .with_writer(writer)
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| AnonymizerError::Configuration(format!("Failed to initialize logging: {}", e)))?;

    tracing::debug!(
        %level,
        file = config.local_enabled,
        directory = %config.local_path,
        "Logging ready"
    );

    Ok(LoggingGuard { file_guard })
}

fn file_writer(config: &LoggingConfig) -> Result<(NonBlocking, WorkerGuard)> {
    let rotation = parse_rotation(&config.local_rotation)?;
    let directory = Path::new(&config.local_path);

    std::fs::create_dir_all(directory).map_err(|e| {
        AnonymizerError::Configuration(format!(
            "Log directory {} cannot be created: {}",
            directory.display(),
            e
        ))
    })?;

    let appender = RollingFileAppender::new(rotation, directory, LOG_FILE_NAME);
    Ok(tracing_appender::non_blocking(appender))
}

/// Parse one of [`VALID_LOG_LEVELS`], ignoring case
pub fn parse_log_level(level: &str) -> Result<Level> {
    let lowered = level.to_lowercase();
    let known = VALID_LOG_LEVELS.contains(&lowered.as_str());
    match lowered.parse::<Level>() {
        Ok(parsed) if known => Ok(parsed),
        _ => Err(AnonymizerError::Configuration(format!(
            "Unknown log level '{}', expected one of: {}",
            level,
            VALID_LOG_LEVELS.join(", ")
        ))),
    }
}

fn parse_rotation(rotation: &str) -> Result<Rotation> {
    Ok(match rotation {
        "daily" => Rotation::DAILY,
        "hourly" => Rotation::HOURLY,
        "never" => Rotation::NEVER,
        other => {
            return Err(AnonymizerError::Configuration(format!(
                "Unknown log rotation '{}', expected daily, hourly or never",
                other
            )))
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("trace", Level::TRACE)]
    #[test_case("Debug", Level::DEBUG)]
    #[test_case("info", Level::INFO)]
    #[test_case("WARN", Level::WARN)]
    #[test_case("error", Level::ERROR)]
    fn test_known_levels(input: &str, expected: Level) {
        assert_eq!(parse_log_level(input).unwrap(), expected);
    }

    #[test_case(""; "empty")]
    #[test_case("verbose"; "unknown word")]
    #[test_case("3"; "numeric")]
    fn test_unknown_levels(input: &str) {
        let error = parse_log_level(input).unwrap_err();
        assert!(error.is_configuration());
    }

    #[test]
    fn test_parse_rotation() {
        assert_eq!(parse_rotation("hourly").unwrap(), Rotation::HOURLY);
        assert_eq!(parse_rotation("never").unwrap(), Rotation::NEVER);
        assert!(parse_rotation("weekly").is_err());
    }

    #[test]
    fn test_file_writer_rejects_bad_rotation_before_creating_directory() {
        let temp = tempfile::TempDir::new().unwrap();
        let directory = temp.path().join("logs");
        let config = LoggingConfig {
            local_enabled: true,
            local_path: directory.to_string_lossy().into_owned(),
            local_rotation: "weekly".to_string(),
            ..LoggingConfig::default()
        };
        assert!(file_writer(&config).is_err());
        assert!(!directory.exists());
    }
}
