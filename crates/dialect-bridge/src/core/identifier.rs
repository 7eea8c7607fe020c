//! Identifier validation, quoting and case folding.
//!
//! Identifiers travel in two directions:
//!
//! - **Outbound to the host**: names read from catalog metadata are folded by
//!   [`to_external`] so that a backend storing `CUSTOMER_ID` surfaces it as
//!   `customer_id`.
//! - **Inbound to the backend**: names the host sends back are folded by
//!   [`to_internal`] into the case the backend stores them in.
//!
//! Mixed-case names are left alone in both directions: they can only exist on
//! the backend as quoted identifiers, and folding them would change identity.
//!
//! # Security
//!
//! Identifiers cannot be bound as statement parameters, so they are validated
//! (no NUL bytes, bounded length) and quoted with the dialect's delimiters,
//! doubling any embedded closing delimiter.

use crate::error::{BridgeError, Result};

/// Maximum identifier length (conservative limit across databases).
/// - PostgreSQL: 63 bytes
/// - SQL Server: 128 characters
/// - Oracle 12.2+: 128 bytes
const MAX_IDENTIFIER_LENGTH: usize = 128;

/// Case in which a backend stores unquoted identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentifierCase {
    /// Unquoted identifiers are stored upper-case (Oracle, DB2, Derby, H2...).
    Upper,
    /// Unquoted identifiers are stored lower-case (PostgreSQL, Informix).
    Lower,
    /// Identifiers are stored as written (SQL Server, MySQL, SQLite).
    Mixed,
}

/// Delimiters used to quote identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentifierQuote {
    /// `"name"`
    DoubleQuote,
    /// `` `name` ``
    Backtick,
    /// `[name]`
    Bracket,
}

impl IdentifierQuote {
    fn delimiters(self) -> (char, char) {
        match self {
            IdentifierQuote::DoubleQuote => ('"', '"'),
            IdentifierQuote::Backtick => ('`', '`'),
            IdentifierQuote::Bracket => ('[', ']'),
        }
    }
}

fn has_lower(value: &str) -> bool {
    value.chars().any(char::is_lowercase)
}

fn has_upper(value: &str) -> bool {
    value.chars().any(char::is_uppercase)
}

/// Fold an identifier read from the backend into the host's convention.
pub fn to_external(value: &str, storage: IdentifierCase) -> String {
    match storage {
        IdentifierCase::Upper if !has_lower(value) => value.to_lowercase(),
        _ => value.to_string(),
    }
}

/// Fold an identifier sent by the host into the backend's storage case.
pub fn to_internal(value: &str, storage: IdentifierCase) -> String {
    match storage {
        IdentifierCase::Upper if !has_upper(value) => value.to_uppercase(),
        IdentifierCase::Lower if !has_lower(value) => value.to_lowercase(),
        _ => value.to_string(),
    }
}

/// Validate an identifier for security issues.
///
/// Rejects:
/// - Empty identifiers
/// - Identifiers containing null bytes (injection vector)
/// - Identifiers exceeding maximum length
///
/// # Errors
///
/// Returns `BridgeError::Config` for invalid identifiers with a descriptive message.
pub fn validate_identifier(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(BridgeError::Config(
            "Identifier cannot be empty".to_string(),
        ));
    }

    if name.contains('\0') {
        return Err(BridgeError::Config(format!(
            "SECURITY: Identifier contains null byte (possible injection attempt): {:?}",
            name
        )));
    }

    if name.len() > MAX_IDENTIFIER_LENGTH {
        return Err(BridgeError::Config(format!(
            "SECURITY: Identifier exceeds maximum length of {} bytes (got {} bytes): {:?}",
            MAX_IDENTIFIER_LENGTH,
            name.len(),
            name
        )));
    }

    Ok(())
}

/// Quote an identifier, doubling any embedded closing delimiter.
pub fn quote_identifier(name: &str, style: IdentifierQuote) -> Result<String> {
    validate_identifier(name)?;
    let (open, close) = style.delimiters();
    let mut out = String::with_capacity(name.len() + 2);
    out.push(open);
    for c in name.chars() {
        if c == close {
            out.push(close);
        }
        out.push(c);
    }
    out.push(close);
    Ok(out)
}

/// Qualify a table name with its schema, quoting both parts.
pub fn qualify(schema: &str, table: &str, style: IdentifierQuote) -> Result<String> {
    Ok(format!(
        "{}.{}",
        quote_identifier(schema, style)?,
        quote_identifier(table, style)?
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    // =========================================================================
    // Case folding
    // =========================================================================

    #[test]
    fn test_upper_storage_external() {
        assert_eq!(to_external("CUSTOMER_ID", IdentifierCase::Upper), "customer_id");
        assert_eq!(to_external("CustomerId", IdentifierCase::Upper), "CustomerId");
        assert_eq!(to_external("ID2", IdentifierCase::Upper), "id2");
    }

    #[test]
    fn test_upper_storage_internal() {
        assert_eq!(to_internal("customer_id", IdentifierCase::Upper), "CUSTOMER_ID");
        assert_eq!(to_internal("CustomerId", IdentifierCase::Upper), "CustomerId");
    }

    #[test]
    fn test_lower_storage() {
        assert_eq!(to_external("customer_id", IdentifierCase::Lower), "customer_id");
        assert_eq!(to_internal("CUSTOMER_ID", IdentifierCase::Lower), "customer_id");
        assert_eq!(to_internal("CustomerId", IdentifierCase::Lower), "CustomerId");
    }

    #[test]
    fn test_mixed_storage_is_identity() {
        assert_eq!(to_external("ORDERS", IdentifierCase::Mixed), "ORDERS");
        assert_eq!(to_internal("orders", IdentifierCase::Mixed), "orders");
    }

    #[test]
    fn test_folding_round_trip_upper() {
        let external = to_external("LINE_ITEMS", IdentifierCase::Upper);
        assert_eq!(to_internal(&external, IdentifierCase::Upper), "LINE_ITEMS");
    }

    // =========================================================================
    // Validation tests
    // =========================================================================

    #[test]
    fn test_validate_identifier_normal() {
        assert!(validate_identifier("users").is_ok());
        assert!(validate_identifier("column with spaces").is_ok());
        assert!(validate_identifier("日本語").is_ok());
    }

    #[test]
    fn test_validate_identifier_rejects_empty() {
        let result = validate_identifier("");
        assert!(result.unwrap_err().to_string().contains("empty"));
    }

    #[test]
    fn test_validate_identifier_rejects_null_byte() {
        let result = validate_identifier("table\0name");
        assert!(result.unwrap_err().to_string().contains("null byte"));
    }

    #[test]
    fn test_validate_identifier_rejects_too_long() {
        let long_name = "a".repeat(MAX_IDENTIFIER_LENGTH + 1);
        let result = validate_identifier(&long_name);
        assert!(result.unwrap_err().to_string().contains("maximum length"));
        assert!(validate_identifier(&"a".repeat(MAX_IDENTIFIER_LENGTH)).is_ok());
    }

    // =========================================================================
    // Quoting tests
    // =========================================================================

    #[test]
    fn test_quote_double_quote() {
        assert_eq!(quote_identifier("users", IdentifierQuote::DoubleQuote).unwrap(), "\"users\"");
        assert_eq!(
            quote_identifier("a\"b", IdentifierQuote::DoubleQuote).unwrap(),
            "\"a\"\"b\""
        );
    }

    #[test]
    fn test_quote_backtick() {
        assert_eq!(quote_identifier("t`n", IdentifierQuote::Backtick).unwrap(), "`t``n`");
    }

    #[test]
    fn test_quote_bracket_only_doubles_closing() {
        assert_eq!(quote_identifier("a[b]c", IdentifierQuote::Bracket).unwrap(), "[a[b]]c]");
    }

    #[test]
    fn test_quote_sql_injection_safely_quoted() {
        let result = quote_identifier("Robert]; DROP TABLE Students;--", IdentifierQuote::Bracket);
        assert_eq!(result.unwrap(), "[Robert]]; DROP TABLE Students;--]");
    }

    #[test]
    fn test_qualify() {
        assert_eq!(
            qualify("dbo", "users", IdentifierQuote::Bracket).unwrap(),
            "[dbo].[users]"
        );
        assert!(qualify("", "users", IdentifierQuote::DoubleQuote).is_err());
    }
}
