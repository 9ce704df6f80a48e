//! Dependencies of a rewrite operation.

use std::sync::Arc;

use geovc_config::{ConfigStore, Platform};
use geovc_index::WorkingState;
use geovc_refs::{RefStore, Reference};
use geovc_store::ObjectDatabase;

use crate::error::{PreconditionViolation, RewriteResult};

/// Everything a rewrite may read or change, passed explicitly.
#[derive(Clone)]
pub struct RewriteContext {
    pub db: ObjectDatabase,
    pub refs: Arc<dyn RefStore>,
    pub work: Arc<dyn WorkingState>,
    pub config: Arc<dyn ConfigStore>,
    pub platform: Arc<dyn Platform>,
}

impl RewriteContext {
    /// Bundle the collaborators a rewrite needs.
    pub fn new(
        db: ObjectDatabase,
        refs: Arc<dyn RefStore>,
        work: Arc<dyn WorkingState>,
        config: Arc<dyn ConfigStore>,
        platform: Arc<dyn Platform>,
    ) -> Self {
        Self {
            db,
            refs,
            work,
            config,
            platform,
        }
    }

    /// Full name of the branch HEAD is attached to.
    ///
    /// Fails with `NoHead` or `DetachedHead` otherwise.
    pub fn current_branch(&self) -> RewriteResult<String> {
        match self.refs.head()? {
            Some(Reference::Symbolic(sym)) => Ok(sym.target),
            Some(Reference::Direct(_)) => Err(PreconditionViolation::DetachedHead.into()),
            None => Err(PreconditionViolation::NoHead.into()),
        }
    }
}

impl std::fmt::Debug for RewriteContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RewriteContext")
            .field("db", &self.db)
            .finish_non_exhaustive()
    }
}
