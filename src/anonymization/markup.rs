//! Markup-aware randomization
//!
//! Rich-text fields carry HTML fragments. Only the characters between tags are
//! randomized; tag bodies and entity references pass through untouched so the
//! fragment stays valid markup. `alt` attribute values are the one piece of
//! tag syntax that gets randomized, in a second pass.

use super::text::{strip_diacritics, TextRandomizer};
use once_cell::sync::Lazy;
use regex::Regex;

static ALT_ATTRIBUTE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(alt=")([^"]*)(")"#).expect("alt attribute pattern"));

/// Scanner flags for one pass over a markup fragment
///
/// The flags overlap on purpose: `&` inside a tag still opens an entity, and
/// the `;` closing it re-enables substitution even before the tag's `>`.
/// Numeric references (`&#...;`) additionally suspend digit substitution until
/// the next `;`, regardless of the other two flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanState {
    in_content: bool,
    in_entity: bool,
    digits_enabled: bool,
}

impl ScanState {
    /// Initial state: content, not inside an entity, digits enabled
    pub fn new() -> Self {
        Self {
            in_content: true,
            in_entity: false,
            digits_enabled: true,
        }
    }

    /// Feed one character (with its successor) and return whether it should be
    /// substituted
    ///
    /// A missing successor never counts as `#`.
    pub fn advance(&mut self, current: char, next: Option<char>) -> bool {
        if current == '>' {
            self.in_content = true;
        }
        if current == '<' {
            self.in_content = false;
        }
        if current == '&' {
            self.in_content = false;
            self.in_entity = true;
        }
        if current == ';' && self.in_entity {
            self.in_content = true;
            self.in_entity = false;
        }
        if current == '&' && next == Some('#') {
            self.digits_enabled = false;
        }
        if current == ';' {
            self.digits_enabled = true;
        }
        self.in_content
    }

    /// Whether digits are currently substituted
    pub fn digits_enabled(&self) -> bool {
        self.digits_enabled
    }
}

impl Default for ScanState {
    fn default() -> Self {
        Self::new()
    }
}

impl TextRandomizer {
    /// Randomize the content characters of a markup fragment
    ///
    /// The fragment is diacritic-stripped first, so the output has as many
    /// characters as the stripped input.
    pub fn markup_text(&mut self, input: &str) -> String {
        let normalized = strip_diacritics(input);
        let chars: Vec<char> = normalized.chars().collect();
        let mut state = ScanState::new();

        let mut output: Vec<char> = Vec::with_capacity(chars.len());
        for (index, &current) in chars.iter().enumerate() {
            let substitute = state.advance(current, chars.get(index + 1).copied());
            if substitute {
                output.push(self.substitute_char(current, state.digits_enabled()));
            } else {
                output.push(current);
            }
        }

        self.randomize_alt_values(&normalized, &mut output);
        output.into_iter().collect()
    }

    /// Overwrite every `alt="..."` value found in `source` with plain-text
    /// randomization, at the same character positions in `output`
    fn randomize_alt_values(&mut self, source: &str, output: &mut [char]) {
        for caps in ALT_ATTRIBUTE.captures_iter(source) {
            let Some(value) = caps.get(2) else {
                continue;
            };
            let start = source[..value.start()].chars().count();
            let replacement = self.plain_text(value.as_str());
            for (offset, c) in replacement.chars().enumerate() {
                if let Some(slot) = output.get_mut(start + offset) {
                    *slot = c;
                }
            }
        }
    }
}
