//! High-level SDK for geovc.
//!
//! [`Repository`] wires the object database, reference store, working
//! state, configuration and clock together and exposes the everyday
//! operations: writing features and trees, committing, branching, walking
//! history and rewriting it.

pub mod error;
pub mod repository;

pub use error::{SdkError, SdkResult};
pub use repository::{Repository, DEFAULT_BRANCH};

// Re-export key types
pub use geovc_config::{
    ConfigStore, FixedPlatform, Identity, InMemoryConfig, Platform, SystemPlatform, TomlConfig,
};
pub use geovc_dag::LogOptions;
pub use geovc_refs::Ref;
pub use geovc_rewrite::{
    PreconditionViolation, ResetMode, RewriteContext, RewriteError, SquashOutcome, SquashRequest,
};
pub use geovc_store::{Commit, Feature, Tree, TreeEntry};
pub use geovc_types::{ObjectId, Person};
