//! Working tree and staging index state for geovc.
//!
//! History rewrites only need a narrow view of the checked-out state: how
//! many changes are pending, which trees the working tree and the staging
//! index are based on, and a way to move or reset both. That view is the
//! [`WorkingState`] trait.
//!
//! # Key Types
//!
//! - [`WorkingState`] -- the contract rewrite operations depend on
//! - [`InMemoryWorkingState`] -- staged and modified paths held in memory
//! - [`WorkingStatus`] -- snapshot of pending changes

pub mod error;
pub mod memory;
pub mod status;
pub mod traits;

pub use error::{IndexError, IndexResult};
pub use memory::InMemoryWorkingState;
pub use status::WorkingStatus;
pub use traits::WorkingState;
