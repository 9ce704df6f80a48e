//! Error types for the index crate.

/// Errors that can occur during working-state operations.
#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    /// An invalid path was provided.
    #[error("invalid path: {0}")]
    InvalidPath(String),

    /// The specified path is not tracked.
    #[error("path not found in index: {0}")]
    PathNotFound(String),

    /// The backing state cannot be reached.
    #[error("working state unavailable: {0}")]
    Unavailable(String),
}

/// Convenience alias for index results.
pub type IndexResult<T> = Result<T, IndexError>;
