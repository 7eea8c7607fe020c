//! IBM Informix dialect.

use crate::core::identifier::IdentifierCase;
use crate::core::traits::Dialect;
use crate::core::types::{ColumnDescriptor, SqlType, TableEntry};

/// IBM Informix dialect implementation.
#[derive(Debug, Clone, Default)]
pub struct InformixDialect;

impl InformixDialect {
    pub fn new() -> Self {
        Self
    }
}

impl Dialect for InformixDialect {
    fn name(&self) -> &str {
        "informix"
    }

    fn identifier_case(&self) -> IdentifierCase {
        IdentifierCase::Lower
    }

    fn is_system_table(&self, table: &TableEntry) -> bool {
        table.name.to_lowercase().starts_with("sys")
    }

    fn reclassify(&self, column: &ColumnDescriptor) -> SqlType {
        match column.sql_type {
            SqlType::Char if column.precision == 1 => SqlType::Char1,
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hooks() {
        let d = InformixDialect::new();
        assert!(d.is_system_table(&TableEntry::new(None, Some("informix"), "systables")));
        assert!(!d.is_system_table(&TableEntry::new(None, Some("informix"), "customer")));
        assert_eq!(d.identifier_to_internal("CUSTOMER"), "customer");
        let flag = ColumnDescriptor::new("flag", SqlType::Char, 1, 0, 1);
        assert_eq!(d.reclassify(&flag), SqlType::Char1);
    }
}
