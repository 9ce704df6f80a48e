//! Reference management for geovc.
//!
//! References are the named, mutable entry points into the commit DAG.
//!
//! # Architecture
//!
//! - A [`Ref`] points directly at a commit id. Branches are refs under
//!   `refs/heads/`.
//! - A [`SymRef`] points at another ref by name. Exactly one level of
//!   indirection is allowed: a symref must resolve to a [`Ref`].
//! - `HEAD` is a symref when a branch is checked out and a direct ref when
//!   detached.
//!
//! Every mutation through a [`RefStore`] is atomic: concurrent readers see
//! the value before or after it, never a mix.
//!
//! # Modules
//!
//! - [`error`]: Error types for ref operations
//! - [`types`]: [`Reference`], [`Ref`], [`SymRef`] and well-known names
//! - [`traits`]: The [`RefStore`] storage contract
//! - [`names`]: Ref and branch name validation
//! - [`memory`]: [`InMemoryRefStore`]

pub mod error;
pub mod memory;
pub mod names;
pub mod traits;
pub mod types;

pub use error::{RefError, Result};
pub use memory::InMemoryRefStore;
pub use names::{validate_branch_name, validate_ref_name};
pub use traits::RefStore;
pub use types::{branch_ref_name, Ref, Reference, SymRef, HEAD, HEADS_PREFIX};
