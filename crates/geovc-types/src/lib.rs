//! Foundation types for geovc, a version-control engine for geospatial
//! feature data.
//!
//! Every other geovc crate depends on `geovc-types`.
//!
//! # Key Types
//!
//! - [`ObjectId`]: Content-addressed identifier (BLAKE3 hash)
//! - [`ObjectKind`]: The kind of a stored object (commit, tree, feature)
//! - [`Person`]: Author/committer identity with timestamp and zone offset

pub mod error;
pub mod object;
pub mod person;

pub use error::TypeError;
pub use object::{ObjectId, ObjectKind};
pub use person::Person;
