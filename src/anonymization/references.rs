//! Attachment reference rewriting
//!
//! Rich-text fields link to files with `src="attachment:NAME"` (shared
//! attachment store) or `src="workitemimg:SEQ-NAME"` (a copy stored next to the
//! containing document). Every reference is rewritten to a randomized name
//! that is identical for the same decoded original name across the whole run,
//! and a [`FileMove`] is emitted so the referenced file ends up under the new
//! name in the output tree.

use super::text::TextRandomizer;
use crate::domain::{AnonymizerError, Result};
use once_cell::sync::Lazy;
use percent_encoding::percent_decode_str;
use regex::Regex;
use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};

/// Groups: 1 `src="`, 2 kind literal, 3 sequence with dash, 4 name, 5 closing quote
pub static ATTACHMENT_REFERENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(src=")(attachment:|workitemimg:(\d+-))([^"]*)(")"#)
        .expect("attachment reference pattern")
});

/// Directory holding the shared attachment store
pub const ATTACHMENTS_DIR: &str = "attachments";

/// File name prefix of per-document image copies
pub const WORK_ITEM_ATTACHMENT_PREFIX: &str = "attachment";

/// Run-wide mapping from decoded original attachment names to replacements
///
/// Entries are created on first lookup and never removed.
#[derive(Debug, Default, Clone)]
pub struct NameConsistencyMap {
    names: HashMap<String, String>,
}

impl NameConsistencyMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the replacement for `original`, generating one on first use
    pub fn resolve(&mut self, original: &str, randomizer: &mut TextRandomizer) -> String {
        self.names
            .entry(original.to_string())
            .or_insert_with(|| randomizer.file_name(original))
            .clone()
    }

    pub fn get(&self, original: &str) -> Option<&str> {
        self.names.get(original).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Attachment files discovered before any document is processed
///
/// Files referenced from a document are removed as they are renamed; whatever
/// remains at the end gets a uniform random name.
#[derive(Debug, Default, Clone)]
pub struct PendingAttachmentSet {
    files: BTreeSet<PathBuf>,
}

impl PendingAttachmentSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl Into<PathBuf>) -> bool {
        self.files.insert(path.into())
    }

    pub fn remove(&mut self, path: &Path) -> bool {
        self.files.remove(path)
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.files.contains(path)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PathBuf> {
        self.files.iter()
    }
}

impl Extend<PathBuf> for PendingAttachmentSet {
    fn extend<T: IntoIterator<Item = PathBuf>>(&mut self, iter: T) {
        self.files.extend(iter);
    }
}

impl IntoIterator for PendingAttachmentSet {
    type Item = PathBuf;
    type IntoIter = std::collections::btree_set::IntoIter<PathBuf>;

    fn into_iter(self) -> Self::IntoIter {
        self.files.into_iter()
    }
}

/// Where a document lives in the input tree and where its output goes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentLocation {
    /// Root of the export being anonymized
    pub input_root: PathBuf,
    /// Root of the anonymized copy
    pub output_root: PathBuf,
    /// Directory of the document, relative to `input_root`
    pub relative_dir: PathBuf,
}

impl DocumentLocation {
    pub fn new(
        input_root: impl Into<PathBuf>,
        output_root: impl Into<PathBuf>,
        relative_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            input_root: input_root.into(),
            output_root: output_root.into(),
            relative_dir: relative_dir.into(),
        }
    }

    /// Location of a document file given both tree roots
    pub fn for_document(input_root: &Path, output_root: &Path, document: &Path) -> Self {
        let relative_dir = document
            .parent()
            .and_then(|parent| parent.strip_prefix(input_root).ok())
            .map(Path::to_path_buf)
            .unwrap_or_default();
        Self::new(input_root, output_root, relative_dir)
    }

    fn input_dir(&self) -> PathBuf {
        self.input_root.join(&self.relative_dir)
    }

    fn output_dir(&self) -> PathBuf {
        self.output_root.join(&self.relative_dir)
    }
}

/// Kind of file a reference points at
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReferenceKind {
    /// Shared attachment store entry
    Attachment,
    /// Per-document copy scoped by a sequence number (`"1-"`, dash included)
    WorkItemImage { sequence: String },
}

/// Copy intent produced by reference rewriting
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileMove {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub kind: ReferenceKind,
}

/// Result of rewriting the references of one fragment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewriteOutcome {
    pub text: String,
    pub moves: Vec<FileMove>,
}

/// Decode a percent-encoded reference name (`+` decodes to a space)
///
/// # Errors
///
/// Returns [`AnonymizerError::Decode`] for a `%` not followed by two hex
/// digits. Byte sequences that are not valid UTF-8 decode to U+FFFD.
pub fn decode_file_name(encoded: &str) -> Result<String> {
    let bytes = encoded.as_bytes();
    for (index, byte) in bytes.iter().enumerate() {
        if *byte == b'%' {
            let valid = bytes
                .get(index + 1..index + 3)
                .is_some_and(|pair| pair.iter().all(u8::is_ascii_hexdigit));
            if !valid {
                return Err(AnonymizerError::Decode(format!(
                    "Malformed percent-encoding in \"{encoded}\" at position {index}"
                )));
            }
        }
    }

    let spaced = encoded.replace('+', " ");
    Ok(percent_decode_str(&spaced).decode_utf8_lossy().into_owned())
}

/// Rewrite every attachment reference in `text`
///
/// Matches are processed left to right. Each decoded name is resolved through
/// `names`; the matching pending entry is removed and a [`FileMove`] recorded.
pub fn rewrite_references(
    text: &str,
    location: &DocumentLocation,
    names: &mut NameConsistencyMap,
    pending: &mut PendingAttachmentSet,
    randomizer: &mut TextRandomizer,
) -> Result<RewriteOutcome> {
    let mut output = String::with_capacity(text.len());
    let mut moves = Vec::new();
    let mut last_end = 0;

    for caps in ATTACHMENT_REFERENCE.captures_iter(text) {
        let (Some(whole), Some(open), Some(kind), Some(name), Some(close)) =
            (caps.get(0), caps.get(1), caps.get(2), caps.get(4), caps.get(5))
        else {
            continue;
        };

        let decoded = decode_file_name(name.as_str())?;
        let replacement = names.resolve(&decoded, randomizer);

        output.push_str(&text[last_end..whole.start()]);
        output.push_str(open.as_str());
        output.push_str(kind.as_str());
        output.push_str(&replacement);
        output.push_str(close.as_str());
        last_end = whole.end();

        let file_move = match caps.get(3) {
            None => FileMove {
                source: location.input_root.join(ATTACHMENTS_DIR).join(&decoded),
                destination: location.output_root.join(ATTACHMENTS_DIR).join(&replacement),
                kind: ReferenceKind::Attachment,
            },
            Some(sequence) => {
                let sequence = sequence.as_str();
                FileMove {
                    source: location.input_dir().join(format!(
                        "{WORK_ITEM_ATTACHMENT_PREFIX}{sequence}{decoded}"
                    )),
                    destination: location.output_dir().join(format!(
                        "{WORK_ITEM_ATTACHMENT_PREFIX}{sequence}{replacement}"
                    )),
                    kind: ReferenceKind::WorkItemImage {
                        sequence: sequence.to_string(),
                    },
                }
            }
        };

        pending.remove(&file_move.source);
        tracing::debug!(
            original = %decoded,
            replacement = %replacement,
            source = %file_move.source.display(),
            "Rewrote attachment reference"
        );
        moves.push(file_move);
    }

    output.push_str(&text[last_end..]);
    Ok(RewriteOutcome {
        text: output,
        moves,
    })
}
