//! MySQL/MariaDB dialect (Strategy pattern).
//!
//! MySQL treats backslash as an escape character inside string literals,
//! quotes identifiers with backticks and reports `BOOLEAN` columns as
//! `TINYINT(1)`.

use crate::core::identifier::{IdentifierCase, IdentifierQuote};
use crate::core::traits::Dialect;
use crate::core::types::{ColumnDescriptor, SqlType, TableEntry};
use crate::decode::DecoderKind;
use crate::quote::LiteralStyle;

const SYSTEM_DATABASES: &[&str] = &["information_schema", "mysql", "performance_schema", "sys"];

/// MySQL/MariaDB dialect implementation.
#[derive(Debug, Clone, Default)]
pub struct MysqlDialect;

impl MysqlDialect {
    /// Create a new MySQL dialect instance.
    pub fn new() -> Self {
        Self
    }
}

impl Dialect for MysqlDialect {
    fn name(&self) -> &str {
        "mysql"
    }

    fn identifier_case(&self) -> IdentifierCase {
        IdentifierCase::Mixed
    }

    fn identifier_quote(&self) -> IdentifierQuote {
        IdentifierQuote::Backtick
    }

    /// MySQL reports databases as catalogs; schemas are usually absent.
    fn is_system_table(&self, table: &TableEntry) -> bool {
        table
            .catalog
            .as_deref()
            .or(table.schema.as_deref())
            .map(|db| SYSTEM_DATABASES.contains(&db.to_lowercase().as_str()))
            .unwrap_or(false)
    }

    fn supports_schemas(&self) -> bool {
        false
    }

    fn decode_override(&self, column: &ColumnDescriptor) -> Option<DecoderKind> {
        match column.sql_type {
            SqlType::TinyInt if column.precision == 1 => Some(DecoderKind::Boolean),
            _ => None,
        }
    }

    fn literal_style(&self) -> LiteralStyle {
        LiteralStyle {
            escape_backslash: true,
            ..LiteralStyle::STANDARD.with_numeric_booleans()
        }
    }
}
