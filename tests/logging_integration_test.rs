//! Integration tests for logging functionality

use polarion_anonymizer::config::LoggingConfig;
use polarion_anonymizer::logging::{init_logging, parse_log_level};
use tempfile::TempDir;

#[test]
fn test_logging_config_default() {
    let config = LoggingConfig::default();
    assert_eq!(config.level, "info");
    assert!(!config.local_enabled);
    assert_eq!(config.local_rotation, "daily");
}

#[test]
fn test_invalid_level_rejected_before_init() {
    assert!(parse_log_level("chatty").is_err());
    assert!(init_logging("chatty", &LoggingConfig::default()).is_err());
}

// The global subscriber can only be installed once per process, so this is
// the only test in this binary that initializes it.
#[test]
fn test_file_logging_creates_directory() {
    let temp_dir = TempDir::new().unwrap();
    let log_path = temp_dir.path().join("logs");

    let config = LoggingConfig {
        local_enabled: true,
        local_path: log_path.to_string_lossy().to_string(),
        local_rotation: "never".to_string(),
        ..LoggingConfig::default()
    };

    let guard = init_logging("debug", &config).unwrap();
    assert!(guard.has_file_writer());
    assert!(log_path.is_dir());

    tracing::info!(test = "file_logging", "Written to the log file");
    drop(guard);

    let entries = std::fs::read_dir(&log_path).unwrap().count();
    assert_eq!(entries, 1);
}
