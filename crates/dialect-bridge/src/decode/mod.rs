//! Column value decoders.
//!
//! A [`Decoder`] extracts one column's value from the current row of a
//! [`RowCursor`]. Decoders are built once per result shape by the
//! [`registry`](registry::DecoderRegistry) and reused for every row.
//!
//! Primitive reads (integer, double, boolean) return the type's zero value
//! for SQL NULL, so the was-null signal is consulted only when the raw read
//! is exactly that zero value.

pub mod opaque;
pub mod registry;

use std::sync::Arc;

use chrono::NaiveDate;
use encoding_rs::Encoding;
use num_bigint::BigInt;

use crate::core::codec;
use crate::core::cursor::RowCursor;
use crate::core::types::SqlType;
use crate::core::value::Value;
use crate::error::{BridgeError, DriverFault, Result};

pub use registry::{DecodedRow, DecoderRegistry, ResultDecoder};

/// Decoding strategy for one semantic column kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DecoderKind {
    Integer,
    BigInteger,
    Decimal,
    Double,
    Boolean,
    String,
    /// Raw bytes decoded with the session's fixed encoding.
    DefaultEncodingString,
    Binary,
    CharStream,
    Date,
    Time,
    Timestamp,
    /// Always NULL regardless of storage.
    Null,
    Xml,
    /// Generic driver-object bridge.
    Object,
    /// Multi-bit strings stay text; single bits decode as booleans.
    BitString,
    /// Fixed-width character column padded by the driver; truncated to width.
    PaddedChar(usize),
    /// Dialect composite types (intervals, geometry, key-value stores).
    DialectObject,
}

impl DecoderKind {
    /// Generic mapping from a (possibly reclassified) type to a decoder.
    ///
    /// Returns `None` only for types that have neither a decoder nor a usable
    /// opaque fallback.
    pub fn for_type(sql_type: SqlType) -> Option<DecoderKind> {
        let kind = match sql_type {
            SqlType::Bit | SqlType::Boolean => DecoderKind::Boolean,
            SqlType::TinyInt | SqlType::SmallInt | SqlType::Integer => DecoderKind::Integer,
            SqlType::BigInt => DecoderKind::BigInteger,
            SqlType::Float | SqlType::Real | SqlType::Double => DecoderKind::Double,
            SqlType::Numeric | SqlType::Decimal => DecoderKind::Decimal,
            SqlType::Char
            | SqlType::VarChar
            | SqlType::NChar
            | SqlType::NVarChar
            | SqlType::RowId => DecoderKind::String,
            SqlType::Char1 => DecoderKind::PaddedChar(1),
            SqlType::LongVarChar | SqlType::LongNVarChar | SqlType::Clob | SqlType::NClob => {
                DecoderKind::CharStream
            }
            SqlType::Binary | SqlType::VarBinary | SqlType::LongVarBinary | SqlType::Blob => {
                DecoderKind::Binary
            }
            SqlType::Date => DecoderKind::Date,
            SqlType::Time | SqlType::TimeWithTimezone => DecoderKind::Time,
            SqlType::Timestamp | SqlType::TimestampWithTimezone => DecoderKind::Timestamp,
            SqlType::SqlXml => DecoderKind::Xml,
            SqlType::Null => DecoderKind::Null,
            SqlType::Ref | SqlType::Datalink => return None,
            SqlType::Other
            | SqlType::JavaObject
            | SqlType::Distinct
            | SqlType::Struct
            | SqlType::Array
            | SqlType::Unknown(_) => DecoderKind::Object,
        };
        Some(kind)
    }

    /// Short name used in diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            DecoderKind::Integer => "integer",
            DecoderKind::BigInteger => "big_integer",
            DecoderKind::Decimal => "decimal",
            DecoderKind::Double => "double",
            DecoderKind::Boolean => "boolean",
            DecoderKind::String => "string",
            DecoderKind::DefaultEncodingString => "string_default_encoding",
            DecoderKind::Binary => "binary",
            DecoderKind::CharStream => "character_stream",
            DecoderKind::Date => "date",
            DecoderKind::Time => "time",
            DecoderKind::Timestamp => "timestamp",
            DecoderKind::Null => "null",
            DecoderKind::Xml => "xml",
            DecoderKind::Object => "object",
            DecoderKind::BitString => "bit_string",
            DecoderKind::PaddedChar(_) => "padded_char",
            DecoderKind::DialectObject => "dialect_object",
        }
    }
}

/// Decoder for a single column of a result shape.
#[derive(Debug, Clone)]
pub struct Decoder {
    label: Arc<str>,
    index: usize,
    kind: DecoderKind,
    encoding: &'static Encoding,
}

impl Decoder {
    /// Create a decoder for the column at 1-based `index`.
    pub fn new(label: Arc<str>, index: usize, kind: DecoderKind, encoding: &'static Encoding) -> Self {
        Self {
            label,
            index,
            kind,
            encoding,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub(crate) fn shared_label(&self) -> Arc<str> {
        Arc::clone(&self.label)
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn kind(&self) -> DecoderKind {
        self.kind
    }

    /// Decode the column from the cursor's current row.
    pub fn decode(&self, cursor: &mut dyn RowCursor) -> Result<Value> {
        self.decode_as(self.kind, cursor)
    }

    /// Decode the column with an explicitly chosen strategy.
    ///
    /// Used when a dialect reclassifies columns per row.
    pub fn decode_as(&self, kind: DecoderKind, cursor: &mut dyn RowCursor) -> Result<Value> {
        let i = self.index;
        let fault = |e: DriverFault| BridgeError::column(self.label.as_ref(), i, kind.name(), e);

        let value = match kind {
            DecoderKind::Integer => {
                let v = cursor.read_i64(i).map_err(fault)?;
                if v == 0 && cursor.was_null().map_err(fault)? {
                    Value::Null
                } else {
                    Value::Integer(v)
                }
            }
            DecoderKind::Double => {
                let v = cursor.read_f64(i).map_err(fault)?;
                if v == 0.0 && cursor.was_null().map_err(fault)? {
                    Value::Null
                } else {
                    Value::Float(v)
                }
            }
            DecoderKind::Boolean => {
                let v = cursor.read_bool(i).map_err(fault)?;
                if !v && cursor.was_null().map_err(fault)? {
                    Value::Null
                } else {
                    Value::Bool(v)
                }
            }
            DecoderKind::BigInteger => match cursor.read_text(i).map_err(fault)? {
                None => Value::Null,
                Some(text) => {
                    let big = text.trim().parse::<BigInt>().map_err(|e| {
                        fault(DriverFault::new(format!("invalid integer text {:?}: {}", text, e)))
                    })?;
                    Value::BigInteger(big)
                }
            },
            DecoderKind::Decimal => cursor.read_decimal(i).map_err(fault)?.into(),
            DecoderKind::String => cursor.read_text(i).map_err(fault)?.into(),
            DecoderKind::DefaultEncodingString => match cursor.read_bytes(i).map_err(fault)? {
                None => Value::Null,
                Some(raw) => Value::Text(codec::decode_with_encoding(&raw, self.encoding).map_err(fault)?),
            },
            DecoderKind::PaddedChar(width) => match cursor.read_text(i).map_err(fault)? {
                None => Value::Null,
                Some(text) => Value::Text(text.chars().take(width).collect()),
            },
            DecoderKind::Binary => match cursor.open_binary_stream(i).map_err(fault)? {
                None => Value::Null,
                Some(mut stream) => {
                    let buf = codec::drain_bytes(stream.as_mut()).map_err(fault)?;
                    Value::Bytes(buf.to_vec())
                }
            },
            DecoderKind::CharStream => match cursor.open_char_stream(i).map_err(fault)? {
                None => Value::Null,
                Some(mut stream) => Value::Text(codec::drain_chars(stream.as_mut()).map_err(fault)?),
            },
            DecoderKind::Date => match cursor.read_date(i).map_err(fault)? {
                None => Value::Null,
                Some(raw) => {
                    let date = NaiveDate::from_ymd_opt(raw.year, raw.month, raw.day).ok_or_else(|| {
                        fault(DriverFault::new(format!(
                            "invalid date {}-{}-{}",
                            raw.year, raw.month, raw.day
                        )))
                    })?;
                    Value::Date(date)
                }
            },
            DecoderKind::Time => cursor.read_time(i).map_err(fault)?.into(),
            DecoderKind::Timestamp => cursor.read_timestamp(i).map_err(fault)?.into(),
            DecoderKind::Null => Value::Null,
            DecoderKind::Xml => match cursor.read_xml(i).map_err(fault)? {
                None => Value::Null,
                Some(mut handle) => {
                    let text = handle.text();
                    let freed = handle.free();
                    match (text, freed) {
                        (Ok(text), Ok(())) => Value::Text(text),
                        (Err(e), _) | (Ok(_), Err(e)) => return Err(fault(e)),
                    }
                }
            },
            DecoderKind::Object => match cursor.read_object(i).map_err(fault)? {
                None => Value::Null,
                Some(obj) => opaque::bridge_object(obj),
            },
            DecoderKind::DialectObject => match cursor.read_object(i).map_err(fault)? {
                None => Value::Null,
                Some(obj) => opaque::bridge_dialect_object(obj),
            },
            DecoderKind::BitString => match cursor.read_text(i).map_err(fault)? {
                None => Value::Null,
                Some(bits) if bits.chars().count() > 1 => Value::Text(bits),
                Some(_) => return self.decode_as(DecoderKind::Boolean, cursor),
            },
        };
        Ok(value)
    }
}
