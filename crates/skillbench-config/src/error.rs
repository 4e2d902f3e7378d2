//! Configuration errors

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse task file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Object '{object}' uses unknown catalog kind '{kind}'")]
    UnknownKind { object: String, kind: String },

    #[error("Duplicate {section} name: {name}")]
    DuplicateName { section: &'static str, name: String },

    #[error("Invalid value for {field}: {reason}")]
    Invalid { field: String, reason: String },

    #[error("Unknown category '{0}' (expected hot, neutral or ground)")]
    UnknownCategory(String),
}

impl ConfigError {
    pub(crate) fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ConfigError>;
