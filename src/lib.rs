// Polarion Anonymizer - Polarion XML export anonymization tool
// Copyright (c) 2026 Polarion Anonymizer Contributors
// Licensed under the Apache License, Version 2.0

//! # Polarion export anonymizer
//!
//! Produces a shareable copy of a Polarion export directory: every
//! human-written text in the XML documents is replaced by random characters of
//! the same shape, attachment files get random names and random content, and
//! every reference from a document to an attachment still resolves.
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Run orchestration and summary
//! - [`anonymization`] - Text, markup and reference randomization engine
//! - [`adapters`] - XML document tree and filesystem primitives
//! - [`domain`] - Error and result types
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use polarion_anonymizer::config::load_config;
//! use polarion_anonymizer::core::run::{RunCoordinator, RunOptions};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("anonymizer.toml")?;
//! let options = RunOptions::from_config("/data/polarion-export", &config);
//!
//! let summary = RunCoordinator::new(options).execute()?;
//! println!("Anonymized {} documents", summary.documents);
//! # Ok(())
//! # }
//! ```
//!
//! ## Consistency
//!
//! The same original attachment name maps to the same random name for the
//! whole run, no matter how many documents reference it:
//!
//! ```rust
//! use polarion_anonymizer::anonymization::references::NameConsistencyMap;
//! use polarion_anonymizer::anonymization::TextRandomizer;
//!
//! let mut randomizer = TextRandomizer::new();
//! let mut names = NameConsistencyMap::new();
//!
//! let first = names.resolve("Budget 2024.xlsx", &mut randomizer);
//! let second = names.resolve("Budget 2024.xlsx", &mut randomizer);
//! assert_eq!(first, second);
//! ```

pub mod adapters;
pub mod anonymization;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
