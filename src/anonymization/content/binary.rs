//! Byte-level content randomization for non-image attachments

use crate::domain::{AnonymizerError, Result};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;

const CHUNK_SIZE: usize = 64 * 1024;

/// Overwrites file content with random bytes, keeping the length
pub struct BinaryContentRandomizer {
    rng: StdRng,
}

impl BinaryContentRandomizer {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Replace every byte of `buffer` with an independent random byte
    pub fn overwrite(&mut self, buffer: &mut [u8]) {
        self.rng.fill_bytes(buffer);
    }

    /// Overwrite the file at `path` in place and return its length
    pub fn randomize_file(&mut self, path: &Path) -> Result<u64> {
        let length = fs::metadata(path)
            .map_err(|e| {
                AnonymizerError::Io(format!("Failed to stat {}: {}", path.display(), e))
            })?
            .len();

        let mut file = OpenOptions::new()
            .write(true)
            .truncate(true)
            .open(path)
            .map_err(|e| {
                AnonymizerError::Io(format!("Failed to open {}: {}", path.display(), e))
            })?;

        let mut chunk = vec![0u8; CHUNK_SIZE];
        let mut remaining = length;
        while remaining > 0 {
            let size = remaining.min(CHUNK_SIZE as u64) as usize;
            self.overwrite(&mut chunk[..size]);
            file.write_all(&chunk[..size]).map_err(|e| {
                AnonymizerError::Io(format!("Failed to write {}: {}", path.display(), e))
            })?;
            remaining -= size as u64;
        }
        file.flush()?;
        Ok(length)
    }
}

impl Default for BinaryContentRandomizer {
    fn default() -> Self {
        Self::new()
    }
}
