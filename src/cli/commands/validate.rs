//! Validate config command implementation

use crate::config::resolve_config;
use clap::Args;
use std::path::Path;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub fn execute(&self, config_path: Option<&Path>) -> anyhow::Result<i32> {
        let shown = config_path
            .map(|path| path.display().to_string())
            .unwrap_or_else(|| "(defaults)".to_string());
        tracing::info!(config_path = %shown, "Validating configuration");

        println!("🔍 Validating configuration: {shown}");
        println!();

        let config = match resolve_config(config_path) {
            Ok(config) => config,
            Err(e) => {
                println!("❌ Configuration is invalid");
                println!("   Error: {e}");
                return Ok(2);
            }
        };

        println!("✅ Configuration is valid");
        println!();
        println!("Configuration Summary:");
        println!("  Output Suffix: {}", config.output.suffix);
        println!("  Randomize Files: {}", config.content.randomize_files);
        println!("  Image Block Size: {}", config.content.image_block_size);
        println!("  Image Extensions: {:?}", config.content.image_extensions);
        println!("  Log Level: {}", config.logging.level);
        if config.logging.local_enabled {
            println!(
                "  Log Files: {} ({})",
                config.logging.local_path, config.logging.local_rotation
            );
        }
        println!();
        Ok(0)
    }
}
