//! IBM DB2 dialect.

use crate::core::traits::{format_type_name_except, Dialect};
use crate::core::types::{CatalogColumn, ColumnDescriptor, SqlType, TableEntry};
use crate::quote::{BinaryLiteral, LiteralStyle};

const BARE_TYPES: &[&str] = &[
    "INTEGER", "SMALLINT", "BIGINT", "DOUBLE", "REAL", "DATE", "TIME", "TIMESTAMP", "XML",
    "BOOLEAN",
];

const SYSTEM_SCHEMAS: &[&str] = &[
    "SYSIBM", "SYSCAT", "SYSSTAT", "SYSTOOLS", "SYSFUN", "SYSPROC", "SYSIBMADM", "SYSPUBLIC",
];

/// DB2 caps hex string constants at 32672 characters.
const HEX_CHUNK_BYTES: usize = 16_000;

/// IBM DB2 dialect implementation.
#[derive(Debug, Clone, Default)]
pub struct Db2Dialect;

impl Db2Dialect {
    pub fn new() -> Self {
        Self
    }
}

impl Dialect for Db2Dialect {
    fn name(&self) -> &str {
        "db2"
    }

    fn reconstruct_type_name(&self, column: &CatalogColumn) -> String {
        format_type_name_except(column, BARE_TYPES)
    }

    fn is_system_table(&self, table: &TableEntry) -> bool {
        SYSTEM_SCHEMAS.contains(&table.schema_upper().as_str())
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
                prefix: "BLOB(X'",
                suffix: "')",
                max_chunk_bytes: Some(HEX_CHUNK_BYTES),
                concat: " || ",
            })
    }
}
