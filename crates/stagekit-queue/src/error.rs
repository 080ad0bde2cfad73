//! Error types for the queue crate.

/// Errors that can occur during queue operations.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum QueueError {
    /// A bounded queue already holds `capacity` items.
    #[error("queue full: capacity {capacity}")]
    Full { capacity: usize },
}

/// Convenience alias for queue results.
pub type QueueResult<T> = Result<T, QueueError>;
