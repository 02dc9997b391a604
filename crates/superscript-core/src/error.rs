use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
/// Errors produced when a delta or selection does not fit the document it targets.
pub enum DocumentError {
    #[error("delta walks {required} chars but the document only has {len}")]
    /// A delta retains or deletes past the end of the document.
    OutOfBounds {
        /// Characters the delta needs in the base document.
        required: usize,
        /// Actual document length in chars.
        len: usize,
    },

    #[error("selection {index}+{length} is outside the document (length {len})")]
    /// A selection range does not fit inside the document.
    InvalidSelection {
        /// Selection start.
        index: usize,
        /// Selection length.
        length: usize,
        /// Actual document length in chars.
        len: usize,
    },
}
