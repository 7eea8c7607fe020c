//! Apache Derby dialect.

use crate::core::traits::{format_type_name_except, Dialect};
use crate::core::types::{CatalogColumn, ColumnDescriptor, SqlType, TableEntry};
use crate::quote::{BinaryLiteral, LiteralStyle};

const BARE_TYPES: &[&str] = &[
    "INTEGER", "SMALLINT", "BIGINT", "DOUBLE", "REAL", "DATE", "TIME", "TIMESTAMP", "BOOLEAN",
    "LONG VARCHAR", "LONG VARCHAR FOR BIT DATA", "XML",
];

/// Apache Derby dialect implementation.
#[derive(Debug, Clone, Default)]
pub struct DerbyDialect;

impl DerbyDialect {
    pub fn new() -> Self {
        Self
    }
}

impl Dialect for DerbyDialect {
    fn name(&self) -> &str {
        "derby"
    }

    fn reconstruct_type_name(&self, column: &CatalogColumn) -> String {
        format_type_name_except(column, BARE_TYPES)
    }

    fn is_system_table(&self, table: &TableEntry) -> bool {
        table.schema_upper().starts_with("SYS")
    }

    fn reclassify(&self, column: &ColumnDescriptor) -> SqlType {
        match column.sql_type {
            SqlType::Char if column.precision == 1 => SqlType::Char1,
            other => other,
        }
    }

    fn literal_style(&self) -> LiteralStyle {
        LiteralStyle::STANDARD
            .with_numeric_booleans()
            .with_binary(BinaryLiteral {
                prefix: "CAST(X'",
                suffix: "' AS BLOB)",
                max_chunk_bytes: None,
                concat: " || ",
            })
    }
}
