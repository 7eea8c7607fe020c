//! H2 dialect.

use crate::core::traits::Dialect;
use crate::core::types::{ColumnDescriptor, SqlType, TableEntry};
use crate::decode::DecoderKind;
use crate::quote::LiteralStyle;

/// H2 database dialect implementation.
#[derive(Debug, Clone, Default)]
pub struct H2Dialect;

impl H2Dialect {
    pub fn new() -> Self {
        Self
    }
}

impl Dialect for H2Dialect {
    fn name(&self) -> &str {
        "h2"
    }

    fn is_system_table(&self, table: &TableEntry) -> bool {
        table.schema_upper() == "INFORMATION_SCHEMA"
    }

    fn decode_override(&self, column: &ColumnDescriptor) -> Option<DecoderKind> {
        match column.sql_type {
            SqlType::Char | SqlType::VarChar => Some(DecoderKind::DefaultEncodingString),
            _ => None,
        }
    }

    fn literal_style(&self) -> LiteralStyle {
        LiteralStyle::STANDARD.with_keyword_booleans()
    }
}
