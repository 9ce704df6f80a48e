//! The [`ConfigStore`] contract and its in-memory implementation.

use std::collections::BTreeMap;
use std::sync::RwLock;

use crate::error::{ConfigError, ConfigResult};

/// String settings addressed by dotted keys such as `user.name`.
pub trait ConfigStore: Send + Sync {
    fn get(&self, key: &str) -> ConfigResult<Option<String>>;

    fn set(&self, key: &str, value: &str) -> ConfigResult<()>;
}

/// Keys are `section.name`, every component non-empty.
pub(crate) fn validate_key(key: &str) -> ConfigResult<()> {
    let invalid = |reason: &str| ConfigError::InvalidKey {
        key: key.to_string(),
        reason: reason.to_string(),
    };
    if !key.contains('.') {
        return Err(invalid("expected section.name"));
    }
    if key.split('.').any(str::is_empty) {
        return Err(invalid("empty key component"));
    }
    if key.chars().any(char::is_whitespace) {
        return Err(invalid("contains whitespace"));
    }
    Ok(())
}

#[derive(Debug, Default)]
pub struct InMemoryConfig {
    values: RwLock<BTreeMap<String, String>>,
}

impl InMemoryConfig {
    /// Empty config.
    pub fn new() -> Self {
        Self::default()
    }

    /// Config pre-populated with `pairs`.
    pub fn with_values<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> ConfigResult<Self> {
        let config = Self::new();
        for (key, value) in pairs {
            config.set(key, value)?;
        }
        Ok(config)
    }
}

impl ConfigStore for InMemoryConfig {
    fn get(&self, key: &str) -> ConfigResult<Option<String>> {
        let values = self
            .values
            .read()
            .map_err(|e| ConfigError::Unavailable(format!("lock poisoned: {e}")))?;
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> ConfigResult<()> {
        validate_key(key)?;
        self.values
            .write()
            .map_err(|e| ConfigError::Unavailable(format!("lock poisoned: {e}")))?
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_then_get() {
        let config = InMemoryConfig::new();
        assert_eq!(config.get("user.name").unwrap(), None);
        config.set("user.name", "Ada").unwrap();
        assert_eq!(config.get("user.name").unwrap().as_deref(), Some("Ada"));
    }

    #[test]
    fn malformed_keys_are_rejected() {
        let config = InMemoryConfig::new();
        for key in ["name", "user.", ".name", "user..name", "user.full name"] {
            assert!(
                matches!(config.set(key, "x"), Err(ConfigError::InvalidKey { .. })),
                "{key:?} should be rejected"
            );
        }
    }

    #[test]
    fn with_values_populates() {
        let config =
            InMemoryConfig::with_values([("user.name", "Ada"), ("user.email", "ada@example.org")])
                .unwrap();
        assert_eq!(config.get("user.email").unwrap().as_deref(), Some("ada@example.org"));
    }
}
