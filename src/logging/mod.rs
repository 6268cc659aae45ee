//! Logging and observability
//!
//! Structured logging through `tracing`, plus a few macros that give run
//! boundaries and per-item progress a consistent shape.
//!
//! # Example
//!
//! ```no_run
//! use polarion_anonymizer::logging::init_logging;
//! use polarion_anonymizer::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!("Application started");
//! ```

pub mod structured;

// Re-export commonly used items
pub use structured::{init_logging, parse_log_level, LoggingGuard};

/// Log the start of an anonymization run
///
/// # Example
///
/// ```no_run
/// use polarion_anonymizer::log_run_start;
///
/// log_run_start!("run-1", "/data/export", "/data/export_anonymized");
/// ```
#[macro_export]
macro_rules! log_run_start {
    ($run_id:expr, $input:expr, $output:expr) => {
        tracing::info!(
            run_id = %$run_id,
            input = %$input,
            output = %$output,
            "Starting anonymization"
        );
    };
}

/// Log the completion of an anonymization run
///
/// # Example
///
/// ```no_run
/// use polarion_anonymizer::log_run_complete;
/// use std::time::Duration;
///
/// log_run_complete!("run-1", 42, Duration::from_secs(10));
/// ```
#[macro_export]
macro_rules! log_run_complete {
    ($run_id:expr, $documents:expr, $duration:expr) => {
        tracing::info!(
            run_id = %$run_id,
            documents = $documents,
            duration_ms = $duration.as_millis() as u64,
            "Anonymization completed"
        );
    };
}

/// Log per-item progress at `info` when `verbose` is set, `debug` otherwise
///
/// # Example
///
/// ```no_run
/// use polarion_anonymizer::log_progress;
///
/// let verbose = true;
/// log_progress!(verbose, file = "workitem.xml", "Processing document");
/// ```
#[macro_export]
macro_rules! log_progress {
    ($verbose:expr, $($arg:tt)+) => {
        if $verbose {
            tracing::info!($($arg)+);
        } else {
            tracing::debug!($($arg)+);
        }
    };
}
