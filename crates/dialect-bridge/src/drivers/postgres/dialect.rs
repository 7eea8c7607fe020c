//! PostgreSQL dialect (Strategy pattern).

use crate::core::identifier::IdentifierCase;
use crate::core::traits::Dialect;
use crate::core::types::{CatalogColumn, ColumnDescriptor, SqlType, TableEntry};
use crate::decode::DecoderKind;
use crate::quote::{BinaryLiteral, LiteralStyle};

/// Column size the catalog reports for unconstrained `numeric`.
const UNBOUNDED_NUMERIC: i64 = 131_089;

/// Column size the catalog reports for unbounded character types.
const UNBOUNDED_LENGTH: i64 = i32::MAX as i64;

/// Types whose catalog size is a length modifier.
const SIZED_TYPES: &[&str] = &[
    "varchar", "bpchar", "char", "character", "character varying", "bit", "varbit",
    "bit varying",
];

/// PostgreSQL dialect implementation.
///
/// Implements the Strategy pattern for SQL syntax differences.
#[derive(Debug, Clone, Default)]
pub struct PostgresDialect;

impl PostgresDialect {
    /// Create a new PostgreSQL dialect instance.
    pub fn new() -> Self {
        Self
    }
}

impl Dialect for PostgresDialect {
    fn name(&self) -> &str {
        "postgres"
    }

    fn identifier_case(&self) -> IdentifierCase {
        IdentifierCase::Lower
    }

    fn reconstruct_type_name(&self, column: &CatalogColumn) -> String {
        let name = column.type_name.as_str();
        let lower = name.to_lowercase();
        match (lower.as_str(), column.precision, column.scale) {
            ("numeric" | "decimal", Some(p), _) if p == UNBOUNDED_NUMERIC || p <= 0 => name.to_string(),
            ("numeric" | "decimal", Some(p), Some(s)) if s > 0 => format!("{}({},{})", name, p, s),
            ("numeric" | "decimal", Some(p), _) => format!("{}({})", name, p),
            (sized, Some(p), _) if SIZED_TYPES.contains(&sized) && p > 0 && p != UNBOUNDED_LENGTH => {
                format!("{}({})", name, p)
            }
            _ => name.to_string(),
        }
    }

    fn is_system_table(&self, table: &TableEntry) -> bool {
        let schema = table.schema.as_deref().unwrap_or_default().to_lowercase();
        schema == "pg_catalog"
            || schema == "information_schema"
            || schema.starts_with("pg_toast")
            || schema.starts_with("pg_temp")
    }

    fn decode_override(&self, column: &ColumnDescriptor) -> Option<DecoderKind> {
        match column.sql_type {
            SqlType::Bit => Some(DecoderKind::BitString),
            SqlType::Other
            | SqlType::JavaObject
            | SqlType::Struct
            | SqlType::Distinct
            | SqlType::Array
            | SqlType::Unknown(_) => Some(DecoderKind::DialectObject),
            _ => None,
        }
    }

    fn literal_style(&self) -> LiteralStyle {
        LiteralStyle::STANDARD.with_binary(BinaryLiteral {
            prefix: "'\\x",
            suffix: "'",
            max_chunk_bytes: None,
            concat: " || ",
        })
    }
}
