//! Firebird dialect.

use crate::core::traits::{format_type_name_except, Dialect};
use crate::core::types::{CatalogColumn, TableEntry};
use crate::quote::{BinaryLiteral, LiteralStyle};

const BARE_TYPES: &[&str] = &[
    "INTEGER", "SMALLINT", "BIGINT", "DOUBLE PRECISION", "FLOAT", "DATE", "TIME", "TIMESTAMP",
    "BOOLEAN", "BLOB", "BLOB SUB_TYPE TEXT", "BLOB SUB_TYPE BINARY",
];

/// Firebird string literals are limited to 32765 bytes.
const HEX_CHUNK_BYTES: usize = 16_000;

/// Firebird dialect implementation.
#[derive(Debug, Clone, Default)]
pub struct FirebirdDialect;

impl FirebirdDialect {
    pub fn new() -> Self {
        Self
    }
}

impl Dialect for FirebirdDialect {
    fn name(&self) -> &str {
        "firebird"
    }

    fn reconstruct_type_name(&self, column: &CatalogColumn) -> String {
        format_type_name_except(column, BARE_TYPES)
    }

    fn is_system_table(&self, table: &TableEntry) -> bool {
        let name = table.name.to_uppercase();
        name.starts_with("RDB$") || name.starts_with("MON$") || name.starts_with("SEC$")
    }

    fn supports_schemas(&self) -> bool {
        false
    }

    fn literal_style(&self) -> LiteralStyle {
        LiteralStyle::STANDARD
            .with_keyword_booleans()
            .with_binary(BinaryLiteral {
                prefix: "x'",
                suffix: "'",
                max_chunk_bytes: Some(HEX_CHUNK_BYTES),
                concat: " || ",
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::value::Value;

    #[test]
    fn test_system_tables() {
        let d = FirebirdDialect::new();
        assert!(d.is_system_table(&TableEntry::new(None, None, "RDB$RELATIONS")));
        assert!(d.is_system_table(&TableEntry::new(None, None, "MON$ATTACHMENTS")));
        assert!(!d.is_system_table(&TableEntry::new(None, None, "CUSTOMERS")));
        assert!(!d.supports_schemas());
    }

    #[test]
    fn test_literals() {
        let d = FirebirdDialect::new();
        assert_eq!(d.quote_literal(&Value::Bool(true), None), "TRUE");
        assert_eq!(d.quote_literal(&Value::Bytes(vec![0xfe]), None), "x'FE'");
    }
}
