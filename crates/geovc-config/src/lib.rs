//! Configuration and platform services for geovc.
//!
//! - [`ConfigStore`] -- string key/value settings under dotted keys
//!   (`user.name`, `user.email`); [`InMemoryConfig`] and the file-backed
//!   [`TomlConfig`] implement it.
//! - [`resolve_identity`] -- the committer [`Identity`] every
//!   commit-producing operation needs.
//! - [`Platform`] -- wall clock and local time-zone offset;
//!   [`SystemPlatform`] for real use, [`FixedPlatform`] for tests.

pub mod error;
pub mod file;
pub mod identity;
pub mod platform;
pub mod store;

pub use error::{ConfigError, ConfigResult};
pub use file::TomlConfig;
pub use identity::{resolve_identity, Identity, USER_EMAIL, USER_NAME};
pub use platform::{FixedPlatform, Platform, SystemPlatform};
pub use store::{ConfigStore, InMemoryConfig};
