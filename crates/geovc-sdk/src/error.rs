use thiserror::Error;

#[derive(Debug, Error)]
pub enum SdkError {
    #[error("branch not found: {0}")]
    BranchNotFound(String),

    #[error("branch already exists: {0}")]
    BranchExists(String),

    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    #[error(transparent)]
    Rewrite(#[from] geovc_rewrite::RewriteError),

    #[error("store error: {0}")]
    Store(#[from] geovc_store::StoreError),

    #[error("ref error: {0}")]
    Ref(#[from] geovc_refs::RefError),

    #[error("index error: {0}")]
    Index(#[from] geovc_index::IndexError),

    #[error("config error: {0}")]
    Config(#[from] geovc_config::ConfigError),
}

impl SdkError {
    /// The precondition that refused a rewrite, if that is what happened.
    pub fn precondition(&self) -> Option<&geovc_rewrite::PreconditionViolation> {
        match self {
            Self::Rewrite(err) => err.precondition(),
            _ => None,
        }
    }
}

pub type SdkResult<T> = Result<T, SdkError>;
