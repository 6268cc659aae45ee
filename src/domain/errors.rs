//! Domain error types
//!
//! All fallible operations in the anonymizer report an [`AnonymizerError`].
//! Third-party error types are flattened into strings so callers never depend
//! on the parser, image codec or filesystem crates directly.

use thiserror::Error;

/// Main anonymizer error type
#[derive(Debug, Error)]
pub enum AnonymizerError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// I/O errors (missing input directory, copy failures, ...)
    #[error("I/O error: {0}")]
    Io(String),

    /// Document parse or serialize errors
    #[error("XML error: {0}")]
    Xml(String),

    /// Malformed percent-encoding in an attachment reference
    #[error("Decode error: {0}")]
    Decode(String),

    /// Image decode or encode errors
    #[error("Image error: {0}")]
    Image(String),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}

impl AnonymizerError {
    /// Returns true for errors caused by configuration problems
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }
}

impl From<std::io::Error> for AnonymizerError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<image::ImageError> for AnonymizerError {
    fn from(err: image::ImageError) -> Self {
        Self::Image(err.to_string())
    }
}
