//! Committer identity.

use serde::{Deserialize, Serialize};

use geovc_types::Person;

use crate::error::{ConfigError, ConfigResult};
use crate::store::ConfigStore;

pub const USER_NAME: &str = "user.name";
pub const USER_EMAIL: &str = "user.email";

/// Name and email of whoever is producing commits.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub name: String,
    pub email: String,
}

impl Identity {
    /// Identity from a display name and email.
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
        }
    }

    /// This identity stamped with a time.
    pub fn at(&self, timestamp_ms: i64, tz_offset_ms: i32) -> Person {
        Person::new(self.name.clone(), self.email.clone(), timestamp_ms, tz_offset_ms)
    }
}

/// Read `user.name` and `user.email`, failing with `MissingKey` for the
/// first one that is unset or blank.
pub fn resolve_identity(config: &dyn ConfigStore) -> ConfigResult<Identity> {
    let name = required(config, USER_NAME)?;
    let email = required(config, USER_EMAIL)?;
    Ok(Identity { name, email })
}

fn required(config: &dyn ConfigStore, key: &str) -> ConfigResult<String> {
    match config.get(key)? {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => {
            let section = key.split_once('.').map_or(key, |(s, _)| s);
            Err(ConfigError::MissingKey {
                key: key.to_string(),
                section: section.to_string(),
            })
        }
    }
}
