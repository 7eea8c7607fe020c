//! SQLite dialect.
//!
//! SQLite is dynamically typed: the type a driver reports for a column
//! follows the value stored in the current row, so columns are reclassified
//! per row. Its driver also raises a spurious fault when savepoint
//! statements are executed, which is recognised here and downgraded by the
//! savepoint manager.

use crate::core::identifier::IdentifierCase;
use crate::core::traits::Dialect;
use crate::core::types::{ColumnDescriptor, SqlType, TableEntry};
use crate::decode::DecoderKind;
use crate::error::DriverFault;
use crate::savepoint::SavepointStrategy;

/// Message the driver raises when a statement produced no result set.
const NO_RESULT_SET: &str = "query does not return ResultSet";

/// SQLite dialect implementation.
#[derive(Debug, Clone, Default)]
pub struct SqliteDialect;

impl SqliteDialect {
    pub fn new() -> Self {
        Self
    }
}

impl Dialect for SqliteDialect {
    fn name(&self) -> &str {
        "sqlite3"
    }

    fn identifier_case(&self) -> IdentifierCase {
        IdentifierCase::Mixed
    }

    fn is_system_table(&self, table: &TableEntry) -> bool {
        table.name.starts_with("sqlite_")
    }

    fn supports_schemas(&self) -> bool {
        false
    }

    fn decode_override(&self, column: &ColumnDescriptor) -> Option<DecoderKind> {
        match column.sql_type {
            SqlType::Char | SqlType::VarChar => Some(DecoderKind::DefaultEncodingString),
            _ => None,
        }
    }

    fn declared_types_unreliable(&self) -> bool {
        true
    }

    fn savepoint_strategy(&self) -> SavepointStrategy {
        SavepointStrategy::Emulated
    }

    fn known_driver_quirk(&self, fault: &DriverFault) -> Option<&'static str> {
        fault
            .message
            .contains(NO_RESULT_SET)
            .then_some("statement returns no result set")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::value::Value;

    #[test]
    fn test_quirk_detection_is_specific() {
        let d = SqliteDialect::new();
        assert!(d.known_driver_quirk(&DriverFault::new("query does not return ResultSet")).is_some());
        assert!(d.known_driver_quirk(&DriverFault::new("database is locked")).is_none());
    }

    #[test]
    fn test_text_columns_use_default_encoding() {
        let d = SqliteDialect::new();
        let col = ColumnDescriptor::new("name", SqlType::VarChar, 0, 0, 1);
        assert_eq!(d.decode_override(&col), Some(DecoderKind::DefaultEncodingString));
        assert!(d.declared_types_unreliable());
    }

    #[test]
    fn test_catalog_hooks() {
        let d = SqliteDialect::new();
        assert!(!d.supports_schemas());
        assert!(d.is_system_table(&TableEntry::new(None, None, "sqlite_sequence")));
        assert!(!d.filter_system_tables(&TableEntry::new(None, None, "sqlite_master"), false));
        assert!(d.filter_system_tables(&TableEntry::new(None, None, "sqlite_master"), true));
    }

    #[test]
    fn test_literals() {
        let d = SqliteDialect::new();
        assert_eq!(d.quote_literal(&Value::Bool(true), None), "'t'");
        assert_eq!(d.quote_literal(&Value::Bytes(vec![1]), None), "X'01'");
        assert_eq!(d.savepoint_sql("s"), "SAVEPOINT s");
    }
}
