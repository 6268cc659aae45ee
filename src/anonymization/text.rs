//! Character, plain-text and file-name randomization
//!
//! [`TextRandomizer`] owns the run's random source and provides the leaf
//! transformations every other strategy is built on:
//!
//! - [`TextRandomizer::substitute_char`] replaces one character with a random
//!   character of the same coarse class
//! - [`TextRandomizer::plain_text`] strips diacritics and substitutes every
//!   character of a string
//! - [`TextRandomizer::file_name`] randomizes a bare file name while keeping its
//!   `attachmentN-` prefix and extension
//!
//! # Examples
//!
//! ```
//! use polarion_anonymizer::anonymization::text::TextRandomizer;
//!
//! let mut randomizer = TextRandomizer::with_seed(7);
//! let name = randomizer.file_name("attachment3-budget.xlsx");
//! assert!(name.starts_with("attachment3-"));
//! assert!(name.ends_with(".xlsx"));
//! ```

use once_cell::sync::Lazy;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

const UPPERCASE: &[u8; 26] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const LOWERCASE: &[u8; 26] = b"abcdefghijklmnopqrstuvwxyz";
const DIGITS: &[u8; 10] = b"0123456789";

/// Replacement for letters outside the ASCII pools
pub const NON_ASCII_LETTER: char = 'W';

static LETTER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\p{L}$").expect("letter pattern"));

static ATTACHMENT_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(attachment\d+-)(.*)$").expect("attachment prefix pattern"));

/// Run-scoped text randomizer
pub struct TextRandomizer {
    rng: StdRng,
}

impl TextRandomizer {
    /// Create a randomizer seeded from OS entropy
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Create a reproducible randomizer
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Substitute a single character
    ///
    /// ASCII letters keep their case, digits are replaced only when
    /// `replace_digits` is set, any other letter (general category `L`)
    /// becomes [`NON_ASCII_LETTER`] and everything else is returned unchanged.
    pub fn substitute_char(&mut self, character: char, replace_digits: bool) -> char {
        if character.is_ascii_uppercase() {
            self.pick(UPPERCASE)
        } else if character.is_ascii_lowercase() {
            self.pick(LOWERCASE)
        } else if replace_digits && character.is_ascii_digit() {
            self.pick(DIGITS)
        } else if is_letter(character) {
            NON_ASCII_LETTER
        } else {
            character
        }
    }

    /// Randomize a plain string
    ///
    /// The output has as many characters as the diacritic-stripped input.
    pub fn plain_text(&mut self, input: &str) -> String {
        strip_diacritics(input)
            .chars()
            .map(|c| self.substitute_char(c, true))
            .collect()
    }

    /// Randomize a bare file name
    ///
    /// A leading `attachmentN-` prefix and the extension after the last `.`
    /// are preserved; only the remaining base name is randomized.
    pub fn file_name(&mut self, input: &str) -> String {
        match ATTACHMENT_PREFIX.captures(input) {
            Some(caps) => {
                let prefix = caps.get(1).map_or("", |m| m.as_str());
                let rest = caps.get(2).map_or("", |m| m.as_str());
                format!("{}{}", prefix, self.file_name_with_extension(rest))
            }
            None => self.file_name_with_extension(input),
        }
    }

    fn file_name_with_extension(&mut self, input: &str) -> String {
        match input.rfind('.') {
            Some(dot) => {
                let (base, extension) = input.split_at(dot);
                format!("{}{}", self.plain_text(base), extension)
            }
            None => self.plain_text(input),
        }
    }

    fn pick(&mut self, pool: &[u8]) -> char {
        char::from(pool[self.rng.gen_range(0..pool.len())])
    }
}

impl Default for TextRandomizer {
    fn default() -> Self {
        Self::new()
    }
}

fn is_letter(character: char) -> bool {
    let mut buffer = [0u8; 4];
    LETTER.is_match(character.encode_utf8(&mut buffer))
}

/// Decompose to NFD and drop combining diacritical marks (U+0300..U+036F)
pub fn strip_diacritics(input: &str) -> String {
    input
        .nfd()
        .filter(|c| !('\u{0300}'..='\u{036F}').contains(c))
        .collect()
}
