//! Error types for reference operations.

use geovc_types::ObjectId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RefError {
    /// The reference, or the ref a symref points at, does not exist.
    #[error("ref not found: {name}")]
    NotFound { name: String },

    /// The name is not a valid ref name.
    #[error("invalid ref name: {name}: {reason}")]
    InvalidName { name: String, reason: String },

    /// A symref points at another symref.
    #[error("symbolic ref {name} points at symbolic ref {target}")]
    SymbolicChain { name: String, target: String },

    /// A direct update was attempted on a symref, or vice versa.
    #[error("ref {name} is {actual}, expected {expected}")]
    WrongKind {
        name: String,
        expected: &'static str,
        actual: &'static str,
    },

    /// Compare-and-swap lost: the ref moved since the caller read it.
    #[error("ref {name} changed concurrently: expected {expected:?}, found {actual:?}")]
    Conflict {
        name: String,
        expected: Option<ObjectId>,
        actual: Option<ObjectId>,
    },

    /// The backend could not be reached or its state is unusable.
    #[error("ref store unavailable: {0}")]
    Unavailable(String),
}

/// Convenience type alias for ref operations.
pub type Result<T> = std::result::Result<T, RefError>;
