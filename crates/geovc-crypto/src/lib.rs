//! Content hashing for geovc.
//!
//! Every stored object is identified by a BLAKE3 hash of its canonical bytes,
//! prefixed with a per-kind domain tag so that a commit and a feature with
//! identical bytes never collide.

pub mod hasher;

pub use hasher::{ContentHasher, HasherError};
