//! Configuration validation.

use super::AdapterConfig;
use crate::core::codec;
use crate::drivers::DialectImpl;
use crate::error::{BridgeError, Result};

/// Validate the configuration.
pub fn validate(config: &AdapterConfig) -> Result<()> {
    if config.dialect.trim().is_empty() {
        return Err(BridgeError::Config("dialect is required".into()));
    }
    DialectImpl::from_db_type(&config.dialect)?;

    if codec::lookup_encoding(&config.default_encoding).is_none() {
        return Err(BridgeError::Config(format!(
            "default_encoding '{}' is not a recognized encoding label",
            config.default_encoding
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> AdapterConfig {
        AdapterConfig::for_dialect("postgres")
    }

    #[test]
    fn test_valid_config() {
        assert!(validate(&valid_config()).is_ok());
    }

    #[test]
    fn test_missing_dialect() {
        let mut config = valid_config();
        config.dialect = "  ".to_string();
        assert!(validate(&config).unwrap_err().to_string().contains("dialect is required"));
    }

    #[test]
    fn test_unknown_dialect() {
        let mut config = valid_config();
        config.dialect = "dbase".to_string();
        assert!(matches!(validate(&config), Err(BridgeError::UnknownDialect(_))));
    }

    #[test]
    fn test_alias_accepted() {
        let mut config = valid_config();
        config.dialect = "sqlserver".to_string();
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_bad_encoding() {
        let mut config = valid_config();
        config.default_encoding = "klingon".to_string();
        assert!(validate(&config).is_err());
        config.default_encoding = "windows-1252".to_string();
        assert!(validate(&config).is_ok());
    }
}
