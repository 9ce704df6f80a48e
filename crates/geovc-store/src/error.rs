use geovc_graph::GraphError;
use geovc_types::ObjectId;

/// Errors from object store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The requested object was not found.
    #[error("object not found: {0}")]
    NotFound(ObjectId),

    /// Serialization or deserialization failure.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// The object data is malformed, of the wrong kind, or does not hash to
    /// the id it was stored under.
    #[error("corrupt object {id}: {reason}")]
    CorruptObject { id: ObjectId, reason: String },

    /// Two different byte sequences produced the same id.
    #[error("hash collision on {0}: stored content differs")]
    HashCollision(ObjectId),

    /// Attempted to write an object whose id is null.
    #[error("cannot store object with null ID")]
    NullObjectId,

    /// The storage backend cannot be reached.
    #[error("object store unavailable: {0}")]
    Unavailable(String),

    /// The graph index rejected or failed an edge registration or query.
    #[error("graph index error: {0}")]
    Graph(#[from] GraphError),
}

impl StoreError {
    /// `true` when the failure is an unreachable backend (object store or
    /// graph index) rather than a problem with the data.
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self,
            Self::Unavailable(_) | Self::Graph(GraphError::Unavailable(_))
        )
    }
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
