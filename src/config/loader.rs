//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::AnonymizerConfig;
use crate::domain::errors::AnonymizerError;
use crate::domain::result::Result;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fs;
use std::path::Path;

/// Configuration file picked up from the working directory when no path is given
pub const DEFAULT_CONFIG_FILE: &str = "anonymizer.toml";

static ENV_PLACEHOLDER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").expect("environment placeholder pattern")
});

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into AnonymizerConfig
/// 4. Applies environment variable overrides (ANONYMIZER_* prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns [`AnonymizerError::Configuration`] if the file is missing or
/// unreadable, a referenced variable is unset, the TOML is malformed, or a
/// value fails validation.
///
/// # Examples
///
/// ```no_run
/// use polarion_anonymizer::config::loader::load_config;
///
/// let config = load_config("anonymizer.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<AnonymizerConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(AnonymizerError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        AnonymizerError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    let contents = substitute_env_vars(&contents)?;

    let config: AnonymizerConfig = toml::from_str(&contents)
        .map_err(|e| AnonymizerError::Configuration(format!("Failed to parse TOML: {}", e)))?;

    finish(config)
}

/// Resolve the configuration for a run
///
/// An explicit `path` must exist. Without one, [`DEFAULT_CONFIG_FILE`] is
/// loaded if present in the working directory, otherwise built-in defaults
/// are used. Environment overrides and validation apply in every case.
pub fn resolve_config(path: Option<&Path>) -> Result<AnonymizerConfig> {
    match path {
        Some(path) => load_config(path),
        None if Path::new(DEFAULT_CONFIG_FILE).exists() => load_config(DEFAULT_CONFIG_FILE),
        None => {
            tracing::debug!("No configuration file found, using defaults");
            finish(AnonymizerConfig::default())
        }
    }
}

fn finish(mut config: AnonymizerConfig) -> Result<AnonymizerConfig> {
    apply_env_overrides(&mut config)?;

    config.validate().map_err(|e| {
        AnonymizerError::Configuration(format!("Configuration validation failed: {}", e))
    })?;

    Ok(config)
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// Comment lines are copied untouched. All missing variables are reported in
/// one error.
fn substitute_env_vars(input: &str) -> Result<String> {
    let mut result = String::with_capacity(input.len());
    let mut missing_vars: Vec<String> = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        let mut processed_line = line.to_string();
        for cap in ENV_PLACEHOLDER.captures_iter(line) {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => {
                    let placeholder = format!("${{{}}}", var_name);
                    processed_line = processed_line.replace(&placeholder, &value);
                }
                Err(_) => {
                    if !missing_vars.iter().any(|name| name == var_name) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        result.push_str(&processed_line);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(AnonymizerError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

/// Applies environment variable overrides using the ANONYMIZER_* prefix
///
/// Variables follow the pattern `ANONYMIZER_<SECTION>_<KEY>`, for example
/// `ANONYMIZER_OUTPUT_SUFFIX` or `ANONYMIZER_LOGGING_LEVEL`.
fn apply_env_overrides(config: &mut AnonymizerConfig) -> Result<()> {
    // Output overrides
    if let Ok(val) = std::env::var("ANONYMIZER_OUTPUT_SUFFIX") {
        config.output.suffix = val;
    }

    // Content overrides
    if let Ok(val) = std::env::var("ANONYMIZER_CONTENT_RANDOMIZE_FILES") {
        config.content.randomize_files = parse_override("ANONYMIZER_CONTENT_RANDOMIZE_FILES", &val)?;
    }
    if let Ok(val) = std::env::var("ANONYMIZER_CONTENT_IMAGE_BLOCK_SIZE") {
        config.content.image_block_size = parse_override("ANONYMIZER_CONTENT_IMAGE_BLOCK_SIZE", &val)?;
    }
    if let Ok(val) = std::env::var("ANONYMIZER_CONTENT_IMAGE_EXTENSIONS") {
        config.content.image_extensions = val
            .split(',')
            .map(|ext| ext.trim().to_lowercase())
            .filter(|ext| !ext.is_empty())
            .collect();
    }

    // Logging overrides
    if let Ok(val) = std::env::var("ANONYMIZER_LOGGING_LEVEL") {
        config.logging.level = val;
    }
    if let Ok(val) = std::env::var("ANONYMIZER_LOGGING_LOCAL_ENABLED") {
        config.logging.local_enabled = parse_override("ANONYMIZER_LOGGING_LOCAL_ENABLED", &val)?;
    }
    if let Ok(val) = std::env::var("ANONYMIZER_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }
    if let Ok(val) = std::env::var("ANONYMIZER_LOGGING_LOCAL_ROTATION") {
        config.logging.local_rotation = val;
    }

    Ok(())
}

fn parse_override<T>(name: &str, value: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e| {
        AnonymizerError::Configuration(format!("Invalid value '{}' for {}: {}", value, name, e))
    })
}

/// Commented configuration file written by `init`
pub fn default_config_toml() -> String {
    r#"# Polarion export anonymizer configuration
# Every key is optional; the values below are the defaults.

[output]
# Output directory = <input directory><suffix>; it must not exist yet
suffix = "_anonymized"

[content]
# Overwrite attachment content after the document pass
randomize_files = true
# Edge length in pixels of the random colour blocks painted into images
image_block_size = 15
# Extensions re-encoded as images; every other non-XML file gets random bytes
image_extensions = ["jpg", "jpeg", "png", "bmp", "gif"]

[logging]
level = "info"          # trace | debug | info | warn | error
local_enabled = false   # also write JSON logs to local_path
local_path = "./logs"
local_rotation = "daily" # daily | hourly | never
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(contents: &str) -> NamedTempFile {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(contents.as_bytes()).unwrap();
        temp_file.flush().unwrap();
        temp_file
    }

    #[test]
    fn test_substitute_env_vars() {
        std::env::set_var("ANONYMIZER_TEST_SUFFIX_VAR", "_copy");
        let input = "suffix = \"${ANONYMIZER_TEST_SUFFIX_VAR}\"";
        let result = substitute_env_vars(input).unwrap();
        assert_eq!(result, "suffix = \"_copy\"\n");
        std::env::remove_var("ANONYMIZER_TEST_SUFFIX_VAR");
    }

    #[test]
    fn test_substitute_env_vars_missing_reported_together() {
        std::env::remove_var("MISSING_VAR_ONE");
        std::env::remove_var("MISSING_VAR_TWO");
        let input = "a = \"${MISSING_VAR_ONE}\"\nb = \"${MISSING_VAR_TWO}\"\n";
        let error = substitute_env_vars(input).unwrap_err().to_string();
        assert!(error.contains("MISSING_VAR_ONE"));
        assert!(error.contains("MISSING_VAR_TWO"));
    }

    #[test]
    fn test_substitute_env_vars_skips_comments() {
        std::env::remove_var("COMMENTED_OUT_VAR");
        let input = "# suffix = \"${COMMENTED_OUT_VAR}\"";
        assert!(substitute_env_vars(input).is_ok());
    }

    #[test]
    fn test_load_config_missing_file() {
        let result = load_config("nonexistent-anonymizer.toml");
        assert!(matches!(result, Err(AnonymizerError::Configuration(_))));
    }

    #[test]
    fn test_load_config_valid() {
        let temp_file = write_config(
            r#"
[output]
suffix = "_scrubbed"

[content]
randomize_files = false
image_block_size = 8
"#,
        );

        let config = load_config(temp_file.path()).unwrap();
        assert_eq!(config.output.suffix, "_scrubbed");
        assert!(!config.content.randomize_files);
        assert_eq!(config.content.image_block_size, 8);
    }

    #[test]
    fn test_load_config_invalid_value() {
        let temp_file = write_config("[content]\nimage_block_size = 0\n");
        let error = load_config(temp_file.path()).unwrap_err();
        assert!(error.is_configuration());
        assert!(error.to_string().contains("image_block_size"));
    }

    #[test]
    fn test_load_config_malformed_toml() {
        let temp_file = write_config("[output\nsuffix = ");
        assert!(load_config(temp_file.path()).is_err());
    }

    #[test]
    fn test_default_config_toml_parses_to_defaults() {
        let config: AnonymizerConfig = toml::from_str(&default_config_toml()).unwrap();
        assert_eq!(config, AnonymizerConfig::default());
    }

    #[test]
    fn test_parse_override() {
        assert_eq!(parse_override::<u32>("X", " 12 ").unwrap(), 12);
        assert!(parse_override::<bool>("X", "maybe").is_err());
    }
}
