//! Run summary and reporting

use crate::domain::{AnonymizerError, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use uuid::Uuid;

/// Counters and timing of one anonymization run
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    /// Unique id of the run, also attached to the start/complete log lines
    pub run_id: Uuid,

    pub input_dir: PathBuf,
    pub output_dir: PathBuf,

    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,

    /// XML documents anonymized and written
    pub documents: usize,

    /// Non-XML files found under `attachments/` and `workitems/`
    pub attachments_discovered: usize,

    /// Attachment references rewritten across all documents
    pub references_rewritten: usize,

    /// Referenced files copied under their new names
    pub files_copied: usize,

    /// Referenced files that did not exist in the input
    pub files_missing: usize,

    /// Attachments never referenced, copied under random names
    pub unreferenced_attachments: usize,

    pub images_randomized: usize,
    pub files_randomized: usize,

    pub duration_ms: u64,
}

impl RunSummary {
    /// Start a summary for a run from `input_dir` into `output_dir`
    pub fn new(input_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            input_dir: input_dir.into(),
            output_dir: output_dir.into(),
            started_at: Utc::now(),
            finished_at: None,
            documents: 0,
            attachments_discovered: 0,
            references_rewritten: 0,
            files_copied: 0,
            files_missing: 0,
            unreferenced_attachments: 0,
            images_randomized: 0,
            files_randomized: 0,
            duration_ms: 0,
        }
    }

    /// Stamp the finish time and elapsed duration
    pub fn finish(&mut self, duration: Duration) {
        self.finished_at = Some(Utc::now());
        self.duration_ms = duration.as_millis() as u64;
    }

    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }

    /// Whether every referenced file was found
    pub fn is_complete(&self) -> bool {
        self.files_missing == 0
    }

    /// Log the summary
    pub fn log_summary(&self) {
        tracing::info!(
            run_id = %self.run_id,
            documents = self.documents,
            attachments_discovered = self.attachments_discovered,
            references_rewritten = self.references_rewritten,
            files_copied = self.files_copied,
            unreferenced_attachments = self.unreferenced_attachments,
            images_randomized = self.images_randomized,
            files_randomized = self.files_randomized,
            duration_ms = self.duration_ms,
            "Run summary"
        );

        if !self.is_complete() {
            tracing::warn!(
                files_missing = self.files_missing,
                "Some referenced files were not found in the input"
            );
        }
    }

    /// Pretty-printed JSON
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| AnonymizerError::Other(format!("Failed to serialize summary: {}", e)))
    }

    /// Write the summary as pretty JSON to `path`
    pub fn write_json(&self, path: &Path) -> Result<()> {
        let json = self.to_json()?;
        fs::write(path, json).map_err(|e| {
            AnonymizerError::Io(format!(
                "Failed to write summary to {}: {}",
                path.display(),
                e
            ))
        })
    }
}
