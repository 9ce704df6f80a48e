//! Graph index for the geovc commit DAG.
//!
//! Commits only carry forward pointers (their parents). The graph index is
//! the derived reverse relation, `children(c) = { d : c ∈ d.parents }`, and
//! is the only way to find branch points: commits with two or more
//! children.
//!
//! The index is consumed through the [`GraphIndex`] trait so that any
//! associative backend can stand behind it. [`InMemoryGraphIndex`] is the
//! reference backend used for tests and embedding.
//!
//! # Failure policy
//!
//! A backend that cannot answer returns [`GraphError::Unavailable`]. Callers
//! must propagate it; an unreachable index is never the same as "no
//! children".

pub mod error;
pub mod memory;
pub mod traits;

pub use error::{GraphError, GraphResult};
pub use memory::InMemoryGraphIndex;
pub use traits::GraphIndex;
