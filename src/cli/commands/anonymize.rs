//! Anonymize command implementation
//!
//! Runs one anonymization of a Polarion export directory.

use crate::config::resolve_config;
use crate::core::run::{normalize_input_dir, RunCoordinator, RunOptions};
use clap::Args;
use std::path::{Path, PathBuf};

/// Arguments for the anonymize command
#[derive(Args, Debug)]
pub struct AnonymizeArgs {
    /// Export directory to anonymize
    #[arg(value_name = "DIRECTORY")]
    pub directory: String,

    /// Log every processed document, field and file at info level
    #[arg(short, long)]
    pub verbose: bool,

    /// Seed the random generators for a reproducible run
    #[arg(long)]
    pub seed: Option<u64>,

    /// Write the run summary as JSON to this file
    #[arg(long, value_name = "PATH")]
    pub summary: Option<PathBuf>,
}

impl AnonymizeArgs {
    /// Execute the anonymize command
    pub fn execute(&self, config_path: Option<&Path>) -> anyhow::Result<i32> {
        let config = match resolve_config(config_path) {
            Ok(config) => config,
            Err(e) => {
                tracing::error!(error = %e, "Configuration error");
                eprintln!("❌ {e}");
                return Ok(2);
            }
        };

        let input_dir = normalize_input_dir(&self.directory)?;
        let options = RunOptions::from_config(input_dir, &config)
            .with_verbose(self.verbose)
            .with_seed(self.seed);

        println!("🔒 Anonymizing {}", options.input_dir.display());
        println!("   Output: {}", options.output_dir().display());

        let summary = RunCoordinator::new(options).execute()?;
        summary.log_summary();

        if let Some(path) = &self.summary {
            summary.write_json(path)?;
            tracing::info!(path = %path.display(), "Summary written");
        }

        println!();
        println!("✅ Anonymization completed");
        println!("   Documents: {}", summary.documents);
        println!("   References rewritten: {}", summary.references_rewritten);
        println!(
            "   Attachments: {} copied, {} unreferenced, {} missing",
            summary.files_copied, summary.unreferenced_attachments, summary.files_missing
        );
        if config.content.randomize_files {
            println!(
                "   Content randomized: {} images, {} other files",
                summary.images_randomized, summary.files_randomized
            );
        }
        println!("   Duration: {:.2}s", summary.duration().as_secs_f64());

        Ok(0)
    }
}
