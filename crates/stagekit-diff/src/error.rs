//! Error types for the diff crate.
//!
//! Diffing itself is total and never fails. These errors come from the
//! reference apply-layer when a changeset does not fit the data it is applied
//! to.

use stagekit_types::ElementPath;

/// Errors that can occur while applying a changeset.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ApplyError {
    /// An index lies outside the collection it refers to.
    #[error("index {index} out of bounds for length {len}")]
    IndexOutOfBounds { index: usize, len: usize },

    /// The same index was removed or filled twice within one stage.
    #[error("index {index} referenced more than once")]
    DuplicateIndex { index: usize },

    /// The survivors plus the inserted and moved items do not add up to the
    /// stage's resulting length.
    #[error("length mismatch: expected {expected}, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    /// A section index lies outside the sectioned collection.
    #[error("section {section} out of bounds for {len} sections")]
    SectionOutOfBounds { section: usize, len: usize },

    /// An element path points past the end of its section.
    #[error("element path {path} out of bounds")]
    PathOutOfBounds { path: ElementPath },

    /// A flat changeset carried section-level edits.
    #[error("flat changeset carries {count} section edits")]
    UnexpectedSectionChanges { count: usize },
}

/// Convenience alias for apply results.
pub type ApplyResult<T> = Result<T, ApplyError>;
