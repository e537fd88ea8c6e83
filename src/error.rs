//! Error types for the changeset library
//!
//! Only fatal conditions live here. Validation failures are data: they are
//! collected on the [`Changeset`](crate::Changeset) as [`FieldError`](crate::FieldError)s.

use thiserror::Error;

/// Result type for changeset operations
pub type Result<T> = std::result::Result<T, ChangesetError>;

/// Fatal changeset errors
#[derive(Error, Debug)]
pub enum ChangesetError {
    #[error("unknown field {field} given to cast")]
    UnknownField { field: String },

    #[error("invalid format pattern for {field}: {source}")]
    InvalidPattern {
        field: String,
        #[source]
        source: regex::Error,
    },

    #[error("expected a JSON object for {what}, got {found}")]
    InvalidRecord { what: String, found: String },

    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    #[error("Config error: {0}")]
    Config(#[from] config_crate::ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("TOML serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),
}

impl ChangesetError {
    pub(crate) fn unknown_field(field: impl Into<String>) -> Self {
        Self::UnknownField { field: field.into() }
    }
}
