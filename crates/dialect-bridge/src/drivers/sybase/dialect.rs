//! Sybase ASE dialect.
//!
//! Shares the Transact-SQL heritage of SQL Server: bracket quoting, `0x`
//! binary literals, `SAVE TRANSACTION` savepoints.

use crate::core::identifier::{IdentifierCase, IdentifierQuote};
use crate::core::traits::{format_type_name_except, Dialect};
use crate::core::types::{CatalogColumn, TableEntry};
use crate::quote::{BinaryLiteral, LiteralStyle};
use crate::savepoint::SavepointStrategy;

const BARE_TYPES: &[&str] = &[
    "int", "bigint", "smallint", "tinyint", "bit", "real", "float", "money", "smallmoney",
    "datetime", "smalldatetime", "date", "time", "text", "unitext", "image", "timestamp",
];

/// Sybase Adaptive Server Enterprise dialect implementation.
#[derive(Debug, Clone, Default)]
pub struct SybaseDialect;

impl SybaseDialect {
    pub fn new() -> Self {
        Self
    }
}

impl Dialect for SybaseDialect {
    fn name(&self) -> &str {
        "sybase"
    }

    fn identifier_case(&self) -> IdentifierCase {
        IdentifierCase::Mixed
    }

    fn identifier_quote(&self) -> IdentifierQuote {
        IdentifierQuote::Bracket
    }

    fn reconstruct_type_name(&self, column: &CatalogColumn) -> String {
        format_type_name_except(column, BARE_TYPES)
    }

    fn is_system_table(&self, table: &TableEntry) -> bool {
        table.name.to_lowercase().starts_with("sys")
    }

    fn literal_style(&self) -> LiteralStyle {
        LiteralStyle {
            national_prefix: true,
            ..LiteralStyle::STANDARD
                .with_numeric_booleans()
                .with_binary(BinaryLiteral {
                    prefix: "0x",
                    suffix: "",
                    max_chunk_bytes: None,
                    concat: " + ",
                })
        }
    }

    fn savepoint_strategy(&self) -> SavepointStrategy {
        SavepointStrategy::Emulated
    }

    fn savepoint_sql(&self, name: &str) -> String {
        format!("SAVE TRANSACTION {}", name)
    }

    fn rollback_to_savepoint_sql(&self, name: &str) -> String {
        format!("ROLLBACK TRANSACTION {}", name)
    }

    fn release_savepoint_sql(&self, _name: &str) -> Option<String> {
        None
    }
}
