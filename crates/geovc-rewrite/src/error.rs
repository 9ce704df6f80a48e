//! Error types for history rewriting.

use geovc_config::ConfigError;
use geovc_index::IndexError;
use geovc_refs::RefError;
use geovc_store::StoreError;
use geovc_types::ObjectId;

/// A rewrite was refused before anything was changed.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum PreconditionViolation {
    #[error("repository has no HEAD")]
    NoHead,

    #[error("cannot rewrite history from a detached HEAD")]
    DetachedHead,

    #[error(
        "working tree and index must be clean ({staged} staged, {unstaged} unstaged changes)"
    )]
    DirtyWorkingTree { staged: usize, unstaged: usize },

    #[error("{since} and {until} share no history")]
    UnrelatedCommits { since: ObjectId, until: ObjectId },

    #[error("commits given in wrong order: {since} is not an ancestor of {until}")]
    WrongOrder { since: ObjectId, until: ObjectId },

    #[error("since commit has no parents")]
    RootSince,

    #[error("{since} is not on the first-parent line of the squashed range")]
    SinceNotOnMainline { since: ObjectId },

    #[error("{until} is not on the first-parent line of the current branch")]
    UntilNotOnBranch { until: ObjectId },

    #[error("commit {commit} in the squashed range is a branch point ({detail})")]
    BranchPointInRange { commit: ObjectId, detail: String },

    #[error("commit {commit} after the squashed range is a branch point ({detail})")]
    BranchPointAfterRange { commit: ObjectId, detail: String },
}

/// Errors that can occur during rewrite operations.
#[derive(Debug, thiserror::Error)]
pub enum RewriteError {
    #[error("precondition failed: {0}")]
    Precondition(#[from] PreconditionViolation),

    /// A backend (object store, graph index, ref store, working state or
    /// config) could not be reached.
    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),

    /// A commit, object or ref does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Ref(RefError),

    #[error(transparent)]
    Store(StoreError),

    #[error(transparent)]
    Index(IndexError),

    #[error(transparent)]
    Config(ConfigError),

    /// A staged replacement chain failed validation.
    #[error("invalid replacement chain: {0}")]
    InvalidChain(String),
}

impl RewriteError {
    /// True if a precondition refused the rewrite before anything was written.
    pub fn is_precondition(&self) -> bool {
        matches!(self, Self::Precondition(_))
    }

    /// The precondition that refused the rewrite, if that is what happened.
    pub fn precondition(&self) -> Option<&PreconditionViolation> {
        match self {
            Self::Precondition(p) => Some(p),
            _ => None,
        }
    }
}

impl From<StoreError> for RewriteError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => Self::NotFound(format!("object {id}")),
            err if err.is_unavailable() => Self::StorageUnavailable(err.to_string()),
            err => Self::Store(err),
        }
    }
}

impl From<RefError> for RewriteError {
    fn from(err: RefError) -> Self {
        match err {
            RefError::NotFound { name } => Self::NotFound(format!("ref {name}")),
            RefError::Unavailable(reason) => Self::StorageUnavailable(reason),
            err => Self::Ref(err),
        }
    }
}

impl From<IndexError> for RewriteError {
    fn from(err: IndexError) -> Self {
        match err {
            IndexError::Unavailable(reason) => Self::StorageUnavailable(reason),
            err => Self::Index(err),
        }
    }
}

impl From<ConfigError> for RewriteError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Unavailable(reason) => Self::StorageUnavailable(reason),
            err => Self::Config(err),
        }
    }
}

/// Convenience alias for rewrite results.
pub type RewriteResult<T> = Result<T, RewriteError>;
