//! Lifecycle errors
//!
//! Only validation failures surface as errors. Unknown ids are silent
//! no-ops and storage failures are logged by the persistence writer.

use thiserror::Error;

/// Why a note was rejected before any state changed
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Note content cannot be empty")]
    EmptyContent,

    #[error("Title is {len} characters long (max {max})")]
    TitleTooLong { len: usize, max: usize },

    #[error("Too many tags: {count} (max {max})")]
    TooManyTags { count: usize, max: usize },

    #[error("Tag '{tag}' is longer than {max} characters")]
    TagTooLong { tag: String, max: usize },
}

/// Errors returned by note lifecycle operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NoteError {
    #[error("Note rejected: {0}")]
    ValidationRejected(#[from] ValidationError),
}

/// Result type for lifecycle operations
pub type NoteResult<T> = Result<T, NoteError>;
