//! Run orchestration
//!
//! This module coordinates a complete anonymization run, including:
//! - Output directory setup
//! - Per-document anonymization and attachment copying
//! - Content randomization of the copied attachments
//! - Run summary reporting

pub mod coordinator;
pub mod summary;

pub use coordinator::{normalize_input_dir, RunCoordinator, RunOptions, WORKITEMS_DIR};
pub use summary::RunSummary;
