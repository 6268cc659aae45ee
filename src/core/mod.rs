//! Run orchestration for the anonymizer
//!
//! # Workflow
//!
//! 1. **Prepare**: create `<input><suffix>`, refusing to reuse an existing one
//! 2. **Discover**: list attachment files under `attachments/` and `workitems/`
//! 3. **Anonymize**: rewrite every XML document and copy the files it references
//! 4. **Sweep**: copy attachments no document referenced under random names
//! 5. **Randomize content**: overwrite images and other files in the output
//! 6. **Report**: return a [`run::RunSummary`]
//!
//! # Example
//!
//! ```rust,no_run
//! use polarion_anonymizer::core::run::{RunCoordinator, RunOptions};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let options = RunOptions::new("/data/polarion-export").with_seed(Some(42));
//! let summary = RunCoordinator::new(options).execute()?;
//!
//! println!("Documents: {}", summary.documents);
//! println!("References rewritten: {}", summary.references_rewritten);
//! # Ok(())
//! # }
//! ```

pub mod run;
