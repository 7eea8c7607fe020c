//! Configuration type definitions.

use serde::{Deserialize, Serialize};

/// How generated keys that are not purely numeric are surfaced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GeneratedKeyFormat {
    /// Non-numeric identifiers (row-identifier tokens) decode as NULL.
    #[default]
    Null,
    /// Non-numeric identifiers are returned as text.
    Text,
}

/// Root configuration structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdapterConfig {
    /// Dialect name or alias (e.g. "postgres", "sqlserver", "sqlite3").
    pub dialect: String,

    /// Return format for non-numeric generated keys (default: null).
    #[serde(default)]
    pub generated_keys: GeneratedKeyFormat,

    /// Emit JDBC escape syntax for temporal literals (default: false).
    #[serde(default)]
    pub escape_processing: bool,

    /// Encoding label for the default-encoding string decoder (default: UTF-8).
    #[serde(default = "default_encoding")]
    pub default_encoding: String,

    /// Keep backend-internal tables during enumeration (default: false).
    #[serde(default)]
    pub include_system_tables: bool,

    /// Maximum cached result shapes per session; 0 disables the cache (default: 64).
    #[serde(default = "default_shape_cache_capacity")]
    pub shape_cache_capacity: usize,
}

impl AdapterConfig {
    /// Configuration with every default applied for `dialect`.
    pub fn for_dialect(dialect: impl Into<String>) -> Self {
        Self {
            dialect: dialect.into(),
            generated_keys: GeneratedKeyFormat::default(),
            escape_processing: false,
            default_encoding: default_encoding(),
            include_system_tables: false,
            shape_cache_capacity: default_shape_cache_capacity(),
        }
    }
}

fn default_encoding() -> String {
    "UTF-8".to_string()
}

fn default_shape_cache_capacity() -> usize {
    64
}
