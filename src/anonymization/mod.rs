//! Content randomization and reference-consistency engine
//!
//! This module holds everything that decides what a document's text becomes:
//!
//! - **text**: character substitution, plain-text and file-name randomization
//! - **markup**: the tag/entity-aware scanner for `text/html` content
//! - **references**: attachment reference rewriting with a run-wide name map
//! - **rules**: the ordered field classification table
//! - **engine**: the per-document entry point tying the above together
//! - **content**: image and binary file randomizers
//!
//! # Usage
//!
//! ```rust,ignore
//! use polarion_anonymizer::anonymization::{anonymize_document, AnonymizationContext};
//!
//! let mut context = AnonymizationContext::new(pending);
//! for (mut document, location) in documents {
//!     let moves = anonymize_document(&mut document, &location, &mut context)?;
//!     adapters::fs::apply_moves(&moves)?;
//! }
//! ```

pub mod content;
pub mod context;
pub mod engine;
pub mod markup;
pub mod references;
pub mod rules;
pub mod text;

// Re-export main types
pub use context::AnonymizationContext;
pub use engine::anonymize_document;
pub use references::{DocumentLocation, FileMove, PendingAttachmentSet, ReferenceKind};
pub use text::TextRandomizer;
