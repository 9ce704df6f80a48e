//! TOML-backed configuration.
//!
//! Tables are flattened into dotted keys on load, so
//!
//! ```toml
//! [user]
//! name = "Ada"
//! ```
//!
//! is read back as `user.name = "Ada"`. Non-string scalars keep their TOML
//! rendering (`core.retries = 3` reads as `"3"`).

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{RwLock, RwLockReadGuard};

use toml::{Table, Value};
use tracing::debug;

use crate::error::{ConfigError, ConfigResult};
use crate::store::{validate_key, ConfigStore};

#[derive(Debug, Default)]
pub struct TomlConfig {
    path: Option<PathBuf>,
    values: RwLock<BTreeMap<String, String>>,
}

impl TomlConfig {
    /// Parse TOML text. The result is not tied to a file.
    pub fn parse(text: &str) -> ConfigResult<Self> {
        let table: Table = text.parse()?;
        let mut values = BTreeMap::new();
        flatten("", &table, &mut values);
        Ok(Self {
            path: None,
            values: RwLock::new(values),
        })
    }

    /// Load from `path`. A missing file yields an empty config bound to
    /// that path.
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let mut config = match fs::read_to_string(path) {
            Ok(text) => Self::parse(&text)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Self::default(),
            Err(e) => return Err(e.into()),
        };
        debug!(path = %path.display(), keys = config.len()?, "loaded config");
        config.path = Some(path.to_path_buf());
        Ok(config)
    }

    /// File this config was loaded from, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Number of keys set.
    pub fn len(&self) -> ConfigResult<usize> {
        Ok(self.read()?.len())
    }

    pub fn is_empty(&self) -> ConfigResult<bool> {
        Ok(self.read()?.is_empty())
    }

    /// Render all settings as nested TOML tables.
    pub fn to_toml_string(&self) -> ConfigResult<String> {
        let mut root = Table::new();
        for (key, value) in self.read()?.iter() {
            insert_nested(&mut root, key, value)?;
        }
        Ok(toml::to_string(&root)?)
    }

    /// Write settings back to the file this config was loaded from.
    pub fn save(&self) -> ConfigResult<()> {
        let Some(path) = &self.path else {
            return Err(ConfigError::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "config has no backing file",
            )));
        };
        fs::write(path, self.to_toml_string()?)?;
        debug!(path = %path.display(), "saved config");
        Ok(())
    }

    fn read(&self) -> ConfigResult<RwLockReadGuard<'_, BTreeMap<String, String>>> {
        self.values
            .read()
            .map_err(|e| ConfigError::Unavailable(format!("lock poisoned: {e}")))
    }
}

fn flatten(prefix: &str, table: &Table, out: &mut BTreeMap<String, String>) {
    for (key, value) in table {
        let full = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        match value {
            Value::Table(inner) => flatten(&full, inner, out),
            Value::String(s) => {
                out.insert(full, s.clone());
            }
            other => {
                out.insert(full, other.to_string());
            }
        }
    }
}

fn insert_nested(root: &mut Table, key: &str, value: &str) -> ConfigResult<()> {
    let clash = || ConfigError::InvalidKey {
        key: key.to_string(),
        reason: "clashes with a value at a shorter key".to_string(),
    };
    let mut parts: Vec<&str> = key.split('.').collect();
    let leaf = parts.pop().unwrap_or(key);
    let mut table = root;
    for part in parts {
        let entry = table
            .entry(part.to_string())
            .or_insert_with(|| Value::Table(Table::new()));
        table = match entry {
            Value::Table(inner) => inner,
            _ => return Err(clash()),
        };
    }
    if matches!(table.get(leaf), Some(Value::Table(_))) {
        return Err(clash());
    }
    table.insert(leaf.to_string(), Value::String(value.to_string()));
    Ok(())
}

impl ConfigStore for TomlConfig {
    fn get(&self, key: &str) -> ConfigResult<Option<String>> {
        Ok(self.read()?.get(key).cloned())
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
    use crate::identity::{resolve_identity, Identity};

    const SAMPLE: &str = r#"
[user]
name = "Ada Lovelace"
email = "ada@example.org"

[core]
retries = 3

[storage.graph]
backend = "memory"
"#;

    #[test]
    fn tables_flatten_to_dotted_keys() {
        let config = TomlConfig::parse(SAMPLE).unwrap();
        assert_eq!(config.get("user.name").unwrap().as_deref(), Some("Ada Lovelace"));
        assert_eq!(config.get("core.retries").unwrap().as_deref(), Some("3"));
        assert_eq!(
            config.get("storage.graph.backend").unwrap().as_deref(),
            Some("memory")
        );
        assert_eq!(config.len().unwrap(), 4);
        assert!(config.path().is_none());
    }

    #[test]
    fn identity_from_toml() {
        let config = TomlConfig::parse(SAMPLE).unwrap();
        assert_eq!(
            resolve_identity(&config).unwrap(),
            Identity::new("Ada Lovelace", "ada@example.org")
        );
    }

    #[test]
    fn invalid_toml_is_a_parse_error() {
        assert!(matches!(
            TomlConfig::parse("[user\nname = 1"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let config = TomlConfig::load(dir.path().join("config.toml")).unwrap();
        assert!(config.is_empty().unwrap());
        assert!(config.path().is_some());
    }

    #[test]
    fn save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let config = TomlConfig::load(&path).unwrap();
        config.set("user.name", "Grace").unwrap();
        config.set("user.email", "grace@example.org").unwrap();
        config.save().unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains("[user]"), "{text}");

        let reloaded = TomlConfig::load(&path).unwrap();
        assert_eq!(
            resolve_identity(&reloaded).unwrap(),
            Identity::new("Grace", "grace@example.org")
        );
    }

    #[test]
    fn save_without_file_fails() {
        let config = TomlConfig::parse(SAMPLE).unwrap();
        assert!(matches!(config.save(), Err(ConfigError::Io(_))));
    }

    #[test]
    fn clashing_keys_cannot_be_rendered() {
        let config = TomlConfig::default();
        config.set("a.b", "1").unwrap();
        config.set("a.b.c", "2").unwrap();
        assert!(matches!(
            config.to_toml_string(),
            Err(ConfigError::InvalidKey { .. })
        ));
    }
}
