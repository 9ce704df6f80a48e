//! Error types for graph index operations.

use geovc_types::ObjectId;

#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    /// The backing index could not be reached or is in an unusable state.
    #[error("graph index unavailable: {0}")]
    Unavailable(String),

    /// A commit was registered as its own parent.
    #[error("commit {0:?} lists itself as a parent")]
    SelfEdge(ObjectId),
}

pub type GraphResult<T> = Result<T, GraphError>;
