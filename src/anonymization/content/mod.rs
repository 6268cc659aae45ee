//! Content randomizers for attachment files
//!
//! Independent of the text engine: images get random colour blocks, every
//! other non-document file gets random bytes.

pub mod binary;
pub mod image;

pub use self::binary::BinaryContentRandomizer;
pub use self::image::{ChannelLayout, ImageContentRandomizer, DEFAULT_BLOCK_SIZE};
