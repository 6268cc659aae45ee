// Polarion Anonymizer - Polarion XML export anonymization tool
// Copyright (c) 2026 Polarion Anonymizer Contributors
// Licensed under the Apache License, Version 2.0

use clap::Parser;
use polarion_anonymizer::cli::{Cli, Commands};
use polarion_anonymizer::config::{resolve_config, LoggingConfig};
use polarion_anonymizer::domain::AnonymizerError;
use polarion_anonymizer::logging::init_logging;
use std::process;

fn main() {
    // Load environment variables from .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // Logging settings come from the configuration when it loads; commands
    // report configuration problems themselves.
    let logging_config = resolve_config(cli.config_path())
        .map(|config| config.logging)
        .unwrap_or_else(|_| LoggingConfig::default());
    let log_level = cli
        .log_level
        .clone()
        .unwrap_or_else(|| logging_config.level.clone());

    let logging_guard = match init_logging(&log_level, &logging_config) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e}");
            process::exit(2);
        }
    };

    tracing::debug!(version = env!("CARGO_PKG_VERSION"), "Polarion export anonymizer");

    let exit_code = match execute_command(&cli) {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %e, "Command execution failed");
            eprintln!("Error: {e}");
            match e.downcast_ref::<AnonymizerError>() {
                Some(error) if error.is_configuration() => 2,
                _ => 1,
            }
        }
    };

    drop(logging_guard);
    process::exit(exit_code);
}

/// Execute the CLI command
fn execute_command(cli: &Cli) -> anyhow::Result<i32> {
    match &cli.command {
        Commands::Anonymize(args) => args.execute(cli.config_path()),
        Commands::ValidateConfig(args) => args.execute(cli.config_path()),
        Commands::Init(args) => args.execute(),
    }
}
