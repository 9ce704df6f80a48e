//! Ancestor and traversal queries over the geovc commit DAG.
//!
//! Commits only point at their parents, so every query here walks parent
//! edges read from an [`ObjectDatabase`](geovc_store::ObjectDatabase):
//!
//! - [`find_common_ancestor`] -- nearest shared ancestor of two commits
//! - [`is_ancestor`] -- reachability test along parent edges
//! - [`log`] -- newest-first topological walk of a commit range
//!
//! Missing commits and backend failures surface as
//! [`StoreError`](geovc_store::StoreError)s; none of these functions
//! mutate anything.

pub mod ancestor;
pub mod log;

#[cfg(test)]
mod fixtures;

pub use ancestor::{find_common_ancestor, is_ancestor};
pub use log::{log, LogIter, LogOptions};
