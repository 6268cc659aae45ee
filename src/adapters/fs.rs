//! Filesystem primitives: discovery, copying and path mirroring

use crate::anonymization::references::FileMove;
use crate::domain::{AnonymizerError, Result};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Lowercase extension of the file name, empty when there is none
pub fn extension(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy())
        .and_then(|name| name.rfind('.').map(|dot| name[dot + 1..].to_lowercase()))
        .unwrap_or_default()
}

pub fn is_xml(path: &Path) -> bool {
    extension(path) == "xml"
}

/// All `.xml` files under `root`, sorted
pub fn find_xml_files(root: &Path) -> Result<Vec<PathBuf>> {
    Ok(walk_files(root)?.into_iter().filter(|p| is_xml(p)).collect())
}

/// All non-XML files under `root`, sorted; empty if `root` does not exist
pub fn find_non_xml_files(root: &Path) -> Result<Vec<PathBuf>> {
    if !root.exists() {
        return Ok(Vec::new());
    }
    Ok(walk_files(root)?.into_iter().filter(|p| !is_xml(p)).collect())
}

fn walk_files(root: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.map_err(|e| {
            AnonymizerError::Io(format!("Failed to walk {}: {}", root.display(), e))
        })?;
        if entry.file_type().is_file() {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

/// Create the parent directory of `path` if needed
pub fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.exists() {
            fs::create_dir_all(parent).map_err(|e| {
                AnonymizerError::Io(format!(
                    "Directory \"{}\" cannot be created: {}",
                    parent.display(),
                    e
                ))
            })?;
        }
    }
    Ok(())
}

/// Outcome of a single copy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyOutcome {
    Copied,
    /// Source did not exist; a warning was logged and nothing was written
    SourceMissing,
}

/// Copy `source` to `destination`, replacing an existing destination
pub fn copy_file(source: &Path, destination: &Path) -> Result<CopyOutcome> {
    ensure_parent_dir(destination)?;
    if !source.exists() {
        tracing::warn!(file = %source.display(), "File was not found");
        return Ok(CopyOutcome::SourceMissing);
    }
    fs::copy(source, destination).map_err(|e| {
        AnonymizerError::Io(format!(
            "Failed to copy file \"{}\" to \"{}\": {}",
            source.display(),
            destination.display(),
            e
        ))
    })?;
    Ok(CopyOutcome::Copied)
}

/// Counters from applying a batch of file moves
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MoveStats {
    pub copied: usize,
    pub missing: usize,
}

/// Apply file-move intents in order
pub fn apply_moves(moves: &[FileMove]) -> Result<MoveStats> {
    let mut stats = MoveStats::default();
    for file_move in moves {
        match copy_file(&file_move.source, &file_move.destination)? {
            CopyOutcome::Copied => stats.copied += 1,
            CopyOutcome::SourceMissing => stats.missing += 1,
        }
    }
    Ok(stats)
}

/// Re-root `path` from the input tree under the output tree
pub fn mirror_path(input_root: &Path, output_root: &Path, path: &Path) -> Result<PathBuf> {
    let relative = path.strip_prefix(input_root).map_err(|_| {
        AnonymizerError::Validation(format!(
            "{} is not inside {}",
            path.display(),
            input_root.display()
        ))
    })?;
    Ok(output_root.join(relative))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anonymization::references::ReferenceKind;
    use tempfile::TempDir;

    #[test]
    fn test_extension() {
        assert_eq!(extension(Path::new("test.JPG")), "jpg");
        assert_eq!(extension(Path::new("/tmp/test")), "");
        assert_eq!(extension(Path::new("dir.v2/archive.tar.gz")), "gz");
        assert!(is_xml(Path::new("workitem.XML")));
    }

    #[test]
    fn test_find_files() {
        let temp = TempDir::new().unwrap();
        let nested = temp.path().join("workitems/WI-1");
        fs::create_dir_all(&nested).unwrap();
        fs::write(nested.join("workitem.xml"), "<a/>").unwrap();
        fs::write(nested.join("attachment1-photo.png"), [1u8, 2, 3]).unwrap();
        fs::write(temp.path().join("project.xml"), "<p/>").unwrap();

        let xml = find_xml_files(temp.path()).unwrap();
        assert_eq!(xml.len(), 2);
        let other = find_non_xml_files(temp.path()).unwrap();
        assert_eq!(other, vec![nested.join("attachment1-photo.png")]);
        assert!(find_non_xml_files(&temp.path().join("missing"))
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_copy_file_creates_directories() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("a.txt");
        fs::write(&source, "content").unwrap();
        let destination = temp.path().join("out/deep/b.txt");

        assert_eq!(copy_file(&source, &destination).unwrap(), CopyOutcome::Copied);
        assert_eq!(fs::read_to_string(&destination).unwrap(), "content");
    }

    #[test]
    fn test_copy_missing_source_is_not_fatal() {
        let temp = TempDir::new().unwrap();
        let outcome = copy_file(&temp.path().join("nope"), &temp.path().join("out/x")).unwrap();
        assert_eq!(outcome, CopyOutcome::SourceMissing);
        assert!(!temp.path().join("out/x").exists());
    }

    #[test]
    fn test_apply_moves_counts() {
        let temp = TempDir::new().unwrap();
        let present = temp.path().join("present.bin");
        fs::write(&present, [0u8; 4]).unwrap();
        let moves = vec![
            FileMove {
                source: present,
                destination: temp.path().join("out/renamed.bin"),
                kind: ReferenceKind::Attachment,
            },
            FileMove {
                source: temp.path().join("absent.bin"),
                destination: temp.path().join("out/other.bin"),
                kind: ReferenceKind::Attachment,
            },
        ];
        let stats = apply_moves(&moves).unwrap();
        assert_eq!(stats, MoveStats { copied: 1, missing: 1 });
    }

    #[test]
    fn test_mirror_path() {
        let mirrored = mirror_path(
            Path::new("/in"),
            Path::new("/in_anonymized"),
            Path::new("/in/attachments/a.txt"),
        )
        .unwrap();
        assert_eq!(mirrored, PathBuf::from("/in_anonymized/attachments/a.txt"));
        assert!(mirror_path(Path::new("/in"), Path::new("/out"), Path::new("/else/a")).is_err());
    }
}
