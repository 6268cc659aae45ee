//! Configuration schema types
//!
//! Every section and every key is optional; a missing file or an empty file
//! yields [`AnonymizerConfig::default`].

use serde::{Deserialize, Serialize};

/// Log levels accepted by `logging.level` and `--log-level`
pub const VALID_LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Rotation strategies accepted by `logging.local_rotation`
pub const VALID_ROTATIONS: [&str; 3] = ["daily", "hourly", "never"];

/// Root configuration structure mapping to the TOML file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnonymizerConfig {
    /// Output directory settings
    #[serde(default)]
    pub output: OutputConfig,

    /// Attachment content randomization settings
    #[serde(default)]
    pub content: ContentConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AnonymizerConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns a description of the first invalid value
    pub fn validate(&self) -> Result<(), String> {
        self.output.validate()?;
        self.content.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

/// Output directory configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Appended to the input directory name to form the output directory
    #[serde(default = "default_suffix")]
    pub suffix: String,
}

impl OutputConfig {
    fn validate(&self) -> Result<(), String> {
        if self.suffix.is_empty() {
            return Err("output.suffix cannot be empty".to_string());
        }
        if self.suffix.contains(['/', '\\']) {
            return Err(format!(
                "output.suffix '{}' must not contain path separators",
                self.suffix
            ));
        }
        Ok(())
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            suffix: default_suffix(),
        }
    }
}

/// Attachment content configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentConfig {
    /// Randomize attachment bytes and pixels after the document pass
    #[serde(default = "default_true")]
    pub randomize_files: bool,

    /// Edge length of the colour blocks painted into images
    #[serde(default = "default_image_block_size")]
    pub image_block_size: u32,

    /// Extensions (lowercase, without dot) treated as images
    #[serde(default = "default_image_extensions")]
    pub image_extensions: Vec<String>,
}

impl ContentConfig {
    fn validate(&self) -> Result<(), String> {
        if self.image_block_size == 0 {
            return Err("content.image_block_size must be > 0".to_string());
        }
        if self.image_extensions.is_empty() {
            return Err("content.image_extensions cannot be empty".to_string());
        }
        if let Some(bad) = self
            .image_extensions
            .iter()
            .find(|ext| ext.is_empty() || ext.starts_with('.'))
        {
            return Err(format!(
                "Invalid content.image_extensions entry '{}': use a bare extension such as \"png\"",
                bad
            ));
        }
        Ok(())
    }

    /// Whether `extension` (already lowercase) names an image format
    pub fn is_image_extension(&self, extension: &str) -> bool {
        self.image_extensions
            .iter()
            .any(|candidate| candidate.eq_ignore_ascii_case(extension))
    }
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            randomize_files: true,
            image_block_size: default_image_block_size(),
            image_extensions: default_image_extensions(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Enable local JSON file logging
    #[serde(default)]
    pub local_enabled: bool,

    /// Local log directory
    #[serde(default = "default_local_path")]
    pub local_path: String,

    /// Log rotation strategy
    #[serde(default = "default_local_rotation")]
    pub local_rotation: String,
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        if !VALID_LOG_LEVELS.contains(&self.level.to_lowercase().as_str()) {
            return Err(format!(
                "Invalid logging.level '{}'. Must be one of: {}",
                self.level,
                VALID_LOG_LEVELS.join(", ")
            ));
        }

        if !VALID_ROTATIONS.contains(&self.local_rotation.as_str()) {
            return Err(format!(
                "Invalid logging.local_rotation '{}'. Must be one of: {}",
                self.local_rotation,
                VALID_ROTATIONS.join(", ")
            ));
        }

        if self.local_enabled && self.local_path.trim().is_empty() {
            return Err("logging.local_path cannot be empty when local_enabled = true".to_string());
        }

        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            local_enabled: false,
            local_path: default_local_path(),
            local_rotation: default_local_rotation(),
        }
    }
}

// Default value functions
fn default_suffix() -> String {
    "_anonymized".to_string()
}

fn default_true() -> bool {
    true
}

fn default_image_block_size() -> u32 {
    15
}

fn default_image_extensions() -> Vec<String> {
    ["jpg", "jpeg", "png", "bmp", "gif"]
        .iter()
        .map(|ext| ext.to_string())
        .collect()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_local_path() -> String {
    "./logs".to_string()
}

fn default_local_rotation() -> String {
    "daily".to_string()
}
