//! HyperSQL (HSQLDB) dialect.

use crate::core::traits::Dialect;
use crate::core::types::TableEntry;
use crate::quote::LiteralStyle;

const SYSTEM_SCHEMAS: &[&str] = &["INFORMATION_SCHEMA", "SYSTEM_LOBS"];

/// HyperSQL dialect implementation.
#[derive(Debug, Clone, Default)]
pub struct HsqldbDialect;

impl HsqldbDialect {
    pub fn new() -> Self {
        Self
    }
}

impl Dialect for HsqldbDialect {
    fn name(&self) -> &str {
        "hsqldb"
    }

    fn is_system_table(&self, table: &TableEntry) -> bool {
        SYSTEM_SCHEMAS.contains(&table.schema_upper().as_str())
    }

    fn literal_style(&self) -> LiteralStyle {
        LiteralStyle::STANDARD.with_keyword_booleans()
    }
}
