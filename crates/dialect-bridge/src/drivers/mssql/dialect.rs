//! MSSQL dialect (Strategy pattern).
//!
//! SQL Server quotes identifiers with brackets, writes binary as `0x...`,
//! needs an `N` prefix on non-ASCII strings and has transaction-level
//! savepoints only (`SAVE TRANSACTION`, no release).

use chrono::NaiveDateTime;

use crate::core::identifier::{IdentifierCase, IdentifierQuote};
use crate::core::traits::{format_type_name_except, Dialect};
use crate::core::types::{CatalogColumn, ColumnDescriptor, SqlType, TableEntry};
use crate::decode::DecoderKind;
use crate::quote::{BinaryLiteral, LiteralStyle};
use crate::savepoint::SavepointStrategy;

/// Column size the catalog reports for `(max)` types.
const MAX_LENGTH: i64 = i32::MAX as i64;

const BARE_TYPES: &[&str] = &[
    "int", "bigint", "smallint", "tinyint", "bit", "real", "float", "money", "smallmoney",
    "uniqueidentifier", "datetime", "smalldatetime", "date", "text", "ntext", "image", "xml",
    "sql_variant", "timestamp", "rowversion", "hierarchyid", "geometry", "geography",
];

const SYSTEM_SCHEMAS: &[&str] = &["SYS", "INFORMATION_SCHEMA"];

/// Microsoft SQL Server dialect implementation.
#[derive(Debug, Clone, Default)]
pub struct MssqlDialect;

impl MssqlDialect {
    /// Create a new MSSQL dialect instance.
    pub fn new() -> Self {
        Self
    }
}

impl Dialect for MssqlDialect {
    fn name(&self) -> &str {
        "mssql"
    }

    fn identifier_case(&self) -> IdentifierCase {
        IdentifierCase::Mixed
    }

    fn identifier_quote(&self) -> IdentifierQuote {
        IdentifierQuote::Bracket
    }

    fn reconstruct_type_name(&self, column: &CatalogColumn) -> String {
        if column.precision == Some(MAX_LENGTH) && !column.type_name.contains('(') {
            let lower = column.type_name.to_lowercase();
            if matches!(lower.as_str(), "varchar" | "nvarchar" | "varbinary") {
                return format!("{}(max)", column.type_name);
            }
        }
        format_type_name_except(column, BARE_TYPES)
    }

    fn is_system_table(&self, table: &TableEntry) -> bool {
        SYSTEM_SCHEMAS.contains(&table.schema_upper().as_str())
    }

    fn decode_override(&self, column: &ColumnDescriptor) -> Option<DecoderKind> {
        match column.sql_type {
            SqlType::LongVarChar | SqlType::LongNVarChar | SqlType::Clob | SqlType::NClob => {
                Some(DecoderKind::String)
            }
            _ => None,
        }
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

    fn quote_timestamp(&self, ts: NaiveDateTime) -> String {
        format!("'{}'", ts.format("%Y-%m-%d %H:%M:%S%.3f"))
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
