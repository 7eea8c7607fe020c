//! SQL type-code vocabulary, column descriptors and catalog rows.
//!
//! Type codes follow the JDBC `java.sql.Types` numbering that generic tabular
//! drivers report. A few synthetic codes exist for classifications that only a
//! dialect can make (for example a one-character `CHAR` column).

use std::fmt;

/// Declared SQL type of a result column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SqlType {
    Bit,
    TinyInt,
    SmallInt,
    Integer,
    BigInt,
    Float,
    Real,
    Double,
    Numeric,
    Decimal,
    Char,
    VarChar,
    LongVarChar,
    NChar,
    NVarChar,
    LongNVarChar,
    Clob,
    NClob,
    Binary,
    VarBinary,
    LongVarBinary,
    Blob,
    Date,
    Time,
    Timestamp,
    TimeWithTimezone,
    TimestampWithTimezone,
    Boolean,
    SqlXml,
    Null,
    Other,
    JavaObject,
    Distinct,
    Struct,
    Array,
    Ref,
    Datalink,
    RowId,

    /// Synthetic: fixed `CHAR(1)` whose driver pads with trailing spaces.
    Char1,

    /// Any code outside the vocabulary.
    Unknown(i32),
}

/// Base code for synthetic, backend-private classifications.
const SYNTHETIC_BASE: i32 = -10_000;

impl SqlType {
    /// Map a driver-reported type code to a `SqlType`.
    pub fn from_code(code: i32) -> Self {
        match code {
            -7 => SqlType::Bit,
            -6 => SqlType::TinyInt,
            5 => SqlType::SmallInt,
            4 => SqlType::Integer,
            -5 => SqlType::BigInt,
            6 => SqlType::Float,
            7 => SqlType::Real,
            8 => SqlType::Double,
            2 => SqlType::Numeric,
            3 => SqlType::Decimal,
            1 => SqlType::Char,
            12 => SqlType::VarChar,
            -1 => SqlType::LongVarChar,
            -15 => SqlType::NChar,
            -9 => SqlType::NVarChar,
            -16 => SqlType::LongNVarChar,
            2005 => SqlType::Clob,
            2011 => SqlType::NClob,
            -2 => SqlType::Binary,
            -3 => SqlType::VarBinary,
            -4 => SqlType::LongVarBinary,
            2004 => SqlType::Blob,
            91 => SqlType::Date,
            92 => SqlType::Time,
            93 => SqlType::Timestamp,
            2013 => SqlType::TimeWithTimezone,
            2014 => SqlType::TimestampWithTimezone,
            16 => SqlType::Boolean,
            2009 => SqlType::SqlXml,
            0 => SqlType::Null,
            1111 => SqlType::Other,
            2000 => SqlType::JavaObject,
            2001 => SqlType::Distinct,
            2002 => SqlType::Struct,
            2003 => SqlType::Array,
            2006 => SqlType::Ref,
            70 => SqlType::Datalink,
            -8 => SqlType::RowId,
            c if c == SYNTHETIC_BASE - 1 => SqlType::Char1,
            other => SqlType::Unknown(other),
        }
    }

    /// The numeric code for this type.
    pub fn code(self) -> i32 {
        match self {
            SqlType::Bit => -7,
            SqlType::TinyInt => -6,
            SqlType::SmallInt => 5,
            SqlType::Integer => 4,
            SqlType::BigInt => -5,
            SqlType::Float => 6,
            SqlType::Real => 7,
            SqlType::Double => 8,
            SqlType::Numeric => 2,
            SqlType::Decimal => 3,
            SqlType::Char => 1,
            SqlType::VarChar => 12,
            SqlType::LongVarChar => -1,
            SqlType::NChar => -15,
            SqlType::NVarChar => -9,
            SqlType::LongNVarChar => -16,
            SqlType::Clob => 2005,
            SqlType::NClob => 2011,
            SqlType::Binary => -2,
            SqlType::VarBinary => -3,
            SqlType::LongVarBinary => -4,
            SqlType::Blob => 2004,
            SqlType::Date => 91,
            SqlType::Time => 92,
            SqlType::Timestamp => 93,
            SqlType::TimeWithTimezone => 2013,
            SqlType::TimestampWithTimezone => 2014,
            SqlType::Boolean => 16,
            SqlType::SqlXml => 2009,
            SqlType::Null => 0,
            SqlType::Other => 1111,
            SqlType::JavaObject => 2000,
            SqlType::Distinct => 2001,
            SqlType::Struct => 2002,
            SqlType::Array => 2003,
            SqlType::Ref => 2006,
            SqlType::Datalink => 70,
            SqlType::RowId => -8,
            SqlType::Char1 => SYNTHETIC_BASE - 1,
            SqlType::Unknown(code) => code,
        }
    }

    /// Whether this is an integral or exact/approximate numeric type.
    pub fn is_numeric(self) -> bool {
        matches!(
            self,
            SqlType::TinyInt
                | SqlType::SmallInt
                | SqlType::Integer
                | SqlType::BigInt
                | SqlType::Float
                | SqlType::Real
                | SqlType::Double
                | SqlType::Numeric
                | SqlType::Decimal
        )
    }
}

impl fmt::Display for SqlType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SqlType::Unknown(code) => write!(f, "UNKNOWN({})", code),
            SqlType::Char1 => f.write_str("CHAR(1)"),
            other => write!(f, "{}", format!("{:?}", other).to_uppercase()),
        }
    }
}

/// Per-column metadata of a result shape.
///
/// Created once per result shape and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ColumnDescriptor {
    /// Column label as reported by the driver.
    pub label: String,
    /// Declared (possibly reclassified) type.
    pub sql_type: SqlType,
    /// Declared precision / column size.
    pub precision: i32,
    /// Declared scale.
    pub scale: i32,
    /// 1-based ordinal.
    pub index: usize,
}

impl ColumnDescriptor {
    /// Create a descriptor.
    pub fn new(
        label: impl Into<String>,
        sql_type: SqlType,
        precision: i32,
        scale: i32,
        index: usize,
    ) -> Self {
        Self {
            label: label.into(),
            sql_type,
            precision,
            scale,
            index,
        }
    }

    /// Same column with a different type, used by reclassification hooks.
    pub fn with_type(&self, sql_type: SqlType) -> Self {
        Self {
            sql_type,
            ..self.clone()
        }
    }
}

/// A column row from catalog metadata (`DatabaseMetaData.getColumns`-style).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogColumn {
    /// Column name.
    pub name: String,
    /// Backend type name, e.g. "varchar", "NUMBER", "nvarchar".
    pub type_name: String,
    /// Column size / precision. `None` when the catalog reports NULL.
    pub precision: Option<i64>,
    /// Decimal digits / scale. `None` when the catalog reports NULL.
    pub scale: Option<i32>,
}

impl CatalogColumn {
    /// Create a catalog column row.
    pub fn new(
        name: impl Into<String>,
        type_name: impl Into<String>,
        precision: Option<i64>,
        scale: Option<i32>,
    ) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            precision,
            scale,
        }
    }
}

/// A table enumeration row from catalog metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableEntry {
    /// Catalog (database) name.
    pub catalog: Option<String>,
    /// Schema name.
    pub schema: Option<String>,
    /// Table name.
    pub name: String,
}

impl TableEntry {
    /// Create a table entry.
    pub fn new(catalog: Option<&str>, schema: Option<&str>, name: impl Into<String>) -> Self {
        Self {
            catalog: catalog.map(str::to_string),
            schema: schema.map(str::to_string),
            name: name.into(),
        }
    }

    /// Schema name upper-cased, or empty when absent.
    pub fn schema_upper(&self) -> String {
        self.schema.as_deref().unwrap_or_default().to_uppercase()
    }
}
