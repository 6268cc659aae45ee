//! Configuration management
//!
//! The anonymizer reads an optional TOML file with three sections:
//!
//! - [`OutputConfig`] - output directory suffix
//! - [`ContentConfig`] - attachment content randomization
//! - [`LoggingConfig`] - log level and local JSON log files
//!
//! Values may reference environment variables with `${VAR_NAME}` and can be
//! overridden with `ANONYMIZER_<SECTION>_<KEY>` variables.
//!
//! # Example Configuration
//!
//! ```toml
//! [output]
//! suffix = "_anonymized"
//!
//! [content]
//! randomize_files = true
//! image_block_size = 15
//!
//! [logging]
//! level = "info"
//! local_enabled = true
//! local_path = "${HOME}/anonymizer-logs"
//! ```

pub mod loader;
pub mod schema;

// Re-export commonly used types
pub use loader::{default_config_toml, load_config, resolve_config, DEFAULT_CONFIG_FILE};
pub use schema::{AnonymizerConfig, ContentConfig, LoggingConfig, OutputConfig};
