//! Content-addressed object storage for geovc.
//!
//! Every commit, tree and feature is stored as an immutable object
//! identified by the BLAKE3 hash of its canonical bytes (domain-separated
//! by object kind).
//!
//! # Object Types
//!
//! - [`Commit`] -- a node of the revision DAG
//! - [`Tree`] -- snapshot listing mapping names to features and sub-trees
//! - [`Feature`] -- a single geospatial feature
//!
//! # Layers
//!
//! - [`ObjectStore`] is the raw backend contract; [`InMemoryObjectStore`]
//!   is the reference backend.
//! - [`ObjectDatabase`] is what the rest of the engine talks to. It decodes
//!   typed objects and keeps the graph index in step with every commit
//!   insertion.
//!
//! # Design Rules
//!
//! 1. Objects are immutable once written. The backend trait has no delete.
//! 2. Writes are idempotent; an id clash with different bytes is corruption.
//! 3. Concurrent reads are always safe.
//! 4. All backend errors are propagated, never silently ignored.

pub mod database;
pub mod error;
pub mod memory;
pub mod object;
pub mod traits;

pub use database::ObjectDatabase;
pub use error::{StoreError, StoreResult};
pub use memory::InMemoryObjectStore;
pub use object::{Commit, CommitBuilder, EntryKind, Feature, StoredObject, Tree, TreeEntry};
pub use traits::ObjectStore;
