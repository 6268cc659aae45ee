//! Run-scoped anonymization state
//!
//! One [`AnonymizationContext`] is built at the start of a run and handed to
//! every per-document call. It owns the only state shared between documents:
//! the random source, the name consistency map and the pending attachments.

use super::references::{
    rewrite_references, DocumentLocation, NameConsistencyMap, PendingAttachmentSet,
    RewriteOutcome,
};
use super::text::TextRandomizer;
use crate::domain::Result;

pub struct AnonymizationContext {
    pub randomizer: TextRandomizer,
    pub names: NameConsistencyMap,
    pub pending: PendingAttachmentSet,
    /// Log per-field decisions at info instead of debug
    pub verbose: bool,
}

impl AnonymizationContext {
    pub fn new(pending: PendingAttachmentSet) -> Self {
        Self::with_randomizer(TextRandomizer::new(), pending)
    }

    pub fn with_randomizer(randomizer: TextRandomizer, pending: PendingAttachmentSet) -> Self {
        Self {
            randomizer,
            names: NameConsistencyMap::new(),
            pending,
            verbose: false,
        }
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Rewrite the attachment references of one fragment
    pub fn rewrite_references(
        &mut self,
        text: &str,
        location: &DocumentLocation,
    ) -> Result<RewriteOutcome> {
        rewrite_references(
            text,
            location,
            &mut self.names,
            &mut self.pending,
            &mut self.randomizer,
        )
    }
}

impl Default for AnonymizationContext {
    fn default() -> Self {
        Self::new(PendingAttachmentSet::new())
    }
}
