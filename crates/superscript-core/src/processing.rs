//! Generic document processing interfaces.
//!
//! Derived document state (heading styles, dialog blocks, count annotations...) is computed by
//! processors that read the live document and answer with a [`Delta`] the caller may apply via
//! [`DocumentStateManager::apply_delta`](crate::DocumentStateManager::apply_delta).

use crate::DocumentStateManager;
use crate::delta::Delta;

/// A generic processor that produces a reconciliation [`Delta`] for a document.
pub trait DocumentProcessor {
    /// The error type returned by [`DocumentProcessor::process`].
    type Error;

    /// Compute the delta needed to bring the document in line with the processor's view of it.
    ///
    /// Returns `Ok(None)` when nothing needs to change. Implementations must not mutate the
    /// document; the caller decides whether and how to apply the result.
    fn process(&mut self, state: &DocumentStateManager) -> Result<Option<Delta>, Self::Error>;
}
