//! Run coordinator - orchestrates one anonymization of an export directory
//!
//! The input tree is never modified. Everything is written into a sibling
//! directory named after the input plus the configured suffix, which must not
//! exist yet. A failed run leaves whatever it already wrote in place.

use super::summary::RunSummary;
use crate::adapters::fs::{self, CopyOutcome};
use crate::adapters::xml::Document;
use crate::anonymization::content::{BinaryContentRandomizer, ImageContentRandomizer};
use crate::anonymization::references::{DocumentLocation, PendingAttachmentSet, ATTACHMENTS_DIR};
use crate::anonymization::{anonymize_document, AnonymizationContext, TextRandomizer};
use crate::config::{AnonymizerConfig, ContentConfig};
use crate::domain::{AnonymizerError, Result};
use crate::{log_progress, log_run_complete, log_run_start};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Directory holding one sub-directory per work item
pub const WORKITEMS_DIR: &str = "workitems";

/// Options for a single run
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Export directory to anonymize, without trailing separator
    pub input_dir: PathBuf,
    /// Appended to `input_dir` to name the output directory
    pub suffix: String,
    /// Log per-item progress at info
    pub verbose: bool,
    /// Seed for reproducible runs
    pub seed: Option<u64>,
    pub content: ContentConfig,
}

impl RunOptions {
    pub fn new(input_dir: impl Into<PathBuf>) -> Self {
        Self::from_config(input_dir, &AnonymizerConfig::default())
    }

    pub fn from_config(input_dir: impl Into<PathBuf>, config: &AnonymizerConfig) -> Self {
        Self {
            input_dir: input_dir.into(),
            suffix: config.output.suffix.clone(),
            verbose: false,
            seed: None,
            content: config.content.clone(),
        }
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    /// `<input_dir><suffix>`
    pub fn output_dir(&self) -> PathBuf {
        let mut name = OsString::from(self.input_dir.as_os_str());
        name.push(&self.suffix);
        PathBuf::from(name)
    }
}

/// Trim trailing `/` or `\` from a directory argument and make it absolute
pub fn normalize_input_dir(raw: &str) -> Result<PathBuf> {
    let trimmed = raw.trim_end_matches(['/', '\\']);
    if trimmed.is_empty() {
        return Err(AnonymizerError::Validation(format!(
            "\"{}\" is not a usable export directory",
            raw
        )));
    }

    let path = PathBuf::from(trimmed);
    if path.is_absolute() {
        return Ok(path);
    }
    let current = std::env::current_dir().map_err(|e| {
        AnonymizerError::Io(format!("Cannot determine working directory: {}", e))
    })?;
    Ok(current.join(path))
}

/// Run coordinator
pub struct RunCoordinator {
    options: RunOptions,
}

impl RunCoordinator {
    pub fn new(options: RunOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &RunOptions {
        &self.options
    }

    /// Execute the run
    ///
    /// 1. Creates the output directory
    /// 2. Collects the pending attachments
    /// 3. Anonymizes every XML document and copies the files it references
    /// 4. Copies attachments nobody referenced under random names
    /// 5. Randomizes attachment content in the output tree (if enabled)
    /// 6. Returns the summary
    pub fn execute(&self) -> Result<RunSummary> {
        let start_time = Instant::now();
        let input = self.options.input_dir.as_path();
        let output = self.options.output_dir();
        let mut summary = RunSummary::new(input, &output);

        log_run_start!(summary.run_id, input.display(), output.display());

        self.prepare_output(input, &output)?;

        let pending = self.collect_pending(input)?;
        summary.attachments_discovered = pending.len();
        tracing::debug!(count = pending.len(), "Attachments discovered");

        let randomizer = match self.options.seed {
            Some(seed) => TextRandomizer::with_seed(seed),
            None => TextRandomizer::new(),
        };
        let mut context =
            AnonymizationContext::with_randomizer(randomizer, pending).with_verbose(self.options.verbose);

        for document_path in fs::find_xml_files(input)? {
            self.process_document(&document_path, &output, &mut context, &mut summary)?;
        }

        self.copy_unreferenced(input, &output, &mut context, &mut summary)?;

        if self.options.content.randomize_files {
            self.randomize_content(&output, &mut summary)?;
        }

        summary.finish(start_time.elapsed());
        log_run_complete!(summary.run_id, summary.documents, summary.duration());
        Ok(summary)
    }

    fn prepare_output(&self, input: &Path, output: &Path) -> Result<()> {
        if !input.is_dir() {
            return Err(AnonymizerError::Io(format!(
                "Directory \"{}\" does not exist",
                input.display()
            )));
        }
        if output.exists() {
            return Err(AnonymizerError::Validation(format!(
                "Output directory \"{}\" already exists",
                output.display()
            )));
        }
        std::fs::create_dir_all(output).map_err(|e| {
            AnonymizerError::Io(format!(
                "Directory \"{}\" cannot be created: {}",
                output.display(),
                e
            ))
        })
    }

    fn collect_pending(&self, input: &Path) -> Result<PendingAttachmentSet> {
        let mut pending = PendingAttachmentSet::new();
        for dir in [ATTACHMENTS_DIR, WORKITEMS_DIR] {
            pending.extend(fs::find_non_xml_files(&input.join(dir))?);
        }
        Ok(pending)
    }

    fn process_document(
        &self,
        path: &Path,
        output: &Path,
        context: &mut AnonymizationContext,
        summary: &mut RunSummary,
    ) -> Result<()> {
        let input = self.options.input_dir.as_path();
        log_progress!(self.options.verbose, file = %path.display(), "Processing document");

        let mut document = Document::from_file(path)?;
        let location = DocumentLocation::for_document(input, output, path);
        let moves = anonymize_document(&mut document, &location, context)?;

        let stats = fs::apply_moves(&moves)?;
        summary.references_rewritten += moves.len();
        summary.files_copied += stats.copied;
        summary.files_missing += stats.missing;

        document.write_to(fs::mirror_path(input, output, path)?)?;
        summary.documents += 1;
        Ok(())
    }

    fn copy_unreferenced(
        &self,
        input: &Path,
        output: &Path,
        context: &mut AnonymizationContext,
        summary: &mut RunSummary,
    ) -> Result<()> {
        for source in context.pending.iter() {
            let Some(name) = source.file_name() else {
                continue;
            };
            let new_name = context.randomizer.file_name(&name.to_string_lossy());
            let destination = fs::mirror_path(input, output, source)?.with_file_name(new_name);

            log_progress!(
                self.options.verbose,
                source = %source.display(),
                destination = %destination.display(),
                "Copying unreferenced attachment"
            );
            if fs::copy_file(source, &destination)? == CopyOutcome::Copied {
                summary.unreferenced_attachments += 1;
            }
        }
        Ok(())
    }

    fn randomize_content(&self, output: &Path, summary: &mut RunSummary) -> Result<()> {
        let content = &self.options.content;
        let (mut images, mut binaries) = match self.options.seed {
            Some(seed) => (
                ImageContentRandomizer::with_seed(seed.wrapping_add(1), content.image_block_size),
                BinaryContentRandomizer::with_seed(seed.wrapping_add(2)),
            ),
            None => (
                ImageContentRandomizer::new(content.image_block_size),
                BinaryContentRandomizer::new(),
            ),
        };

        for path in fs::find_non_xml_files(output)? {
            if content.is_image_extension(&fs::extension(&path)) {
                log_progress!(self.options.verbose, file = %path.display(), "Randomizing picture");
                images.randomize_file(&path)?;
                summary.images_randomized += 1;
            } else {
                log_progress!(self.options.verbose, file = %path.display(), "Randomizing file");
                binaries.randomize_file(&path)?;
                summary.files_randomized += 1;
            }
        }
        Ok(())
    }
}
