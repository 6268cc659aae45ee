//! Domain types shared across the anonymizer.
//!
//! - **Error types** ([`AnonymizerError`])
//! - **Result type alias** ([`Result`])

pub mod errors;
pub mod result;

pub use errors::AnonymizerError;
pub use result::Result;
