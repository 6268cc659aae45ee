//! Adapters for external collaborators
//!
//! - [`xml`] - Document parsing and serialization
//! - [`fs`] - File discovery, copying and path mirroring
//!
//! Nothing in here decides *what* gets anonymized; the core in
//! [`crate::anonymization`] works on the types these adapters produce.

pub mod fs;
pub mod xml;

pub use xml::{Document, Element, Node};
