//! Configuration loading and validation.

mod types;
mod validation;

pub use types::*;

use encoding_rs::Encoding;
use std::path::Path;

use crate::core::codec;
use crate::error::{BridgeError, Result};

impl AdapterConfig {
    /// Load configuration from a YAML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: AdapterConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        validation::validate(self)
    }

    /// Resolved encoding for the default-encoding string decoder.
    pub fn encoding(&self) -> Result<&'static Encoding> {
        codec::lookup_encoding(&self.default_encoding).ok_or_else(|| {
            BridgeError::Config(format!("Unknown encoding: {}", self.default_encoding))
        })
    }
}
