//! Oracle dialect (Strategy pattern).
//!
//! Oracle stores unquoted identifiers upper-case, reports every exact
//! numeric as `NUMBER`, and has no `RELEASE SAVEPOINT` statement.

use chrono::{NaiveDate, NaiveDateTime};

use crate::core::traits::{format_type_name_except, Dialect};
use crate::core::types::{CatalogColumn, ColumnDescriptor, SqlType, TableEntry};
use crate::decode::DecoderKind;
use crate::quote::{BinaryLiteral, LiteralStyle};
use crate::savepoint::SavepointStrategy;

/// Scale reported for `FLOAT` columns.
const FLOAT_SCALE: i32 = -127;

/// Largest precision whose values always fit an `i32`-sized integer.
const SMALL_INTEGER_PRECISION: i32 = 9;

/// Types whose catalog size is implied and must not be echoed back.
const BARE_TYPES: &[&str] = &[
    "DATE", "CLOB", "NCLOB", "BLOB", "BFILE", "LONG", "LONG RAW", "ROWID", "BINARY_FLOAT",
    "BINARY_DOUBLE", "XMLTYPE",
];

const SYSTEM_SCHEMAS: &[&str] = &[
    "SYS", "SYSTEM", "OUTLN", "DBSNMP", "CTXSYS", "MDSYS", "ORDSYS", "ORDDATA", "XDB", "WMSYS",
    "OLAPSYS", "EXFSYS", "LBACSYS", "APPQOSSYS", "AUDSYS", "GSMADMIN_INTERNAL",
];

/// Oracle hex literals are capped at 4000 characters.
const HEX_CHUNK_BYTES: usize = 2000;

/// Oracle Database dialect implementation.
#[derive(Debug, Clone, Default)]
pub struct OracleDialect;

impl OracleDialect {
    /// Create a new Oracle dialect instance.
    pub fn new() -> Self {
        Self
    }
}

impl Dialect for OracleDialect {
    fn name(&self) -> &str {
        "oracle"
    }

    fn reconstruct_type_name(&self, column: &CatalogColumn) -> String {
        if column.type_name.eq_ignore_ascii_case("NUMBER") {
            return match (column.precision, column.scale) {
                (Some(p), Some(s)) if p > 0 && s > 0 => format!("NUMBER({},{})", p, s),
                (Some(p), _) if p > 0 => format!("NUMBER({})", p),
                _ => "NUMBER".to_string(),
            };
        }
        format_type_name_except(column, BARE_TYPES)
    }

    fn is_system_table(&self, table: &TableEntry) -> bool {
        let schema = table.schema_upper();
        SYSTEM_SCHEMAS.contains(&schema.as_str()) || table.name.starts_with("BIN$")
    }

    fn decode_override(&self, column: &ColumnDescriptor) -> Option<DecoderKind> {
        match column.sql_type {
            SqlType::Numeric | SqlType::Decimal => match (column.precision, column.scale) {
                (p, 0) if (1..=SMALL_INTEGER_PRECISION).contains(&p) => Some(DecoderKind::Integer),
                (p, 0) if p > SMALL_INTEGER_PRECISION => Some(DecoderKind::BigInteger),
                (p, FLOAT_SCALE) if p > 0 => Some(DecoderKind::Double),
                _ => None,
            },
            _ => None,
        }
    }

    fn literal_style(&self) -> LiteralStyle {
        LiteralStyle::STANDARD
            .with_numeric_booleans()
            .with_binary(BinaryLiteral {
                prefix: "HEXTORAW('",
                suffix: "')",
                max_chunk_bytes: Some(HEX_CHUNK_BYTES),
                concat: " || ",
            })
    }

    fn quote_date(&self, date: NaiveDate) -> String {
        format!("DATE '{}'", date.format("%Y-%m-%d"))
    }

    fn quote_timestamp(&self, ts: NaiveDateTime) -> String {
        format!("TIMESTAMP '{}'", ts.format("%Y-%m-%d %H:%M:%S%.f"))
    }

    fn savepoint_strategy(&self) -> SavepointStrategy {
        SavepointStrategy::Emulated
    }

    fn release_savepoint_sql(&self, _name: &str) -> Option<String> {
        None
    }
}
