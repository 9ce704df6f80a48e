//! History rewriting for geovc.
//!
//! Every operation takes a [`RewriteContext`] carrying the object database,
//! reference store, working state, configuration and clock it is allowed to
//! touch. There is no ambient repository handle.
//!
//! - [`reset_to_commit`] -- move the current branch (and optionally the
//!   staging index and working tree) to a commit
//! - [`commit_on_head`] -- record a new commit on the checked-out branch
//! - [`squash`] -- collapse a contiguous run of mainline commits into one and
//!   replay later history on top
//!
//! # Atomicity
//!
//! Rewrites validate every precondition before writing anything, build the
//! replacement commits in memory, write them (objects are append-only and
//! unreachable until referenced) and publish the result with one
//! compare-and-swap of the branch ref. A failure at any point leaves every
//! ref as it was.

pub mod commit;
pub mod context;
pub mod error;
pub mod reset;
pub mod squash;

#[cfg(test)]
mod fixtures;

pub use commit::{commit_on_head, create_commit};
pub use context::RewriteContext;
pub use error::{PreconditionViolation, RewriteError, RewriteResult};
pub use reset::{reset_to_commit, update_ref, update_symref, ResetMode};
pub use squash::{squash, SquashOutcome, SquashRequest};
