//! Error types for the config crate.

/// Errors that can occur while reading or writing configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A required key has no value.
    #[error("{key} not found in config; set it with `{key} = \"...\"` under [{section}]")]
    MissingKey { key: String, section: String },

    /// A key is not of the form `section.name`.
    #[error("invalid config key {key:?}: {reason}")]
    InvalidKey { key: String, reason: String },

    /// The config source is not valid TOML.
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// The config could not be rendered as TOML.
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("config I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The backing store cannot be reached.
    #[error("config unavailable: {0}")]
    Unavailable(String),
}

/// Convenience alias for config results.
pub type ConfigResult<T> = Result<T, ConfigError>;
