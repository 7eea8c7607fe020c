//! Host value model produced by decoders and consumed by the quoting engine.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use num_bigint::BigInt;
use rust_decimal::Decimal;
use uuid::Uuid;

/// A single decoded column value.
///
/// Values are fully owned: one decoded row is handed to the host and outlives
/// the cursor position it was read from.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Stored SQL NULL.
    Null,

    /// Boolean value.
    Bool(bool),

    /// 64-bit signed integer.
    Integer(i64),

    /// Arbitrary-precision integer.
    BigInteger(BigInt),

    /// 64-bit floating point.
    Float(f64),

    /// Exact decimal.
    Decimal(Decimal),

    /// Text.
    Text(String),

    /// Raw bytes.
    Bytes(Vec<u8>),

    /// Calendar date without timezone.
    Date(NaiveDate),

    /// Time of day without timezone.
    Time(NaiveTime),

    /// Timestamp without timezone.
    Timestamp(NaiveDateTime),

    /// UUID.
    Uuid(Uuid),

    /// Associative text pairs (e.g. a PostgreSQL hstore).
    Map(BTreeMap<String, Option<String>>),
}

impl Value {
    /// Check if this value is NULL.
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Short name of the variant, used in diagnostics.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Integer(_) => "integer",
            Value::BigInteger(_) => "big_integer",
            Value::Float(_) => "float",
            Value::Decimal(_) => "decimal",
            Value::Text(_) => "text",
            Value::Bytes(_) => "bytes",
            Value::Date(_) => "date",
            Value::Time(_) => "time",
            Value::Timestamp(_) => "timestamp",
            Value::Uuid(_) => "uuid",
            Value::Map(_) => "map",
        }
    }

    /// Borrow the text payload, if this is a text value.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Convert to a JSON value for display.
    ///
    /// Bytes render as lowercase hex, temporal values in ISO 8601, and exact
    /// numerics as strings so no precision is lost.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::Value as Json;

        match self {
            Value::Null => Json::Null,
            Value::Bool(b) => Json::Bool(*b),
            Value::Integer(i) => Json::from(*i),
            Value::BigInteger(i) => Json::String(i.to_string()),
            Value::Float(f) => serde_json::Number::from_f64(*f)
                .map(Json::Number)
                .unwrap_or_else(|| Json::String(f.to_string())),
            Value::Decimal(d) => Json::String(d.to_string()),
            Value::Text(s) => Json::String(s.clone()),
            Value::Bytes(b) => Json::String(hex::encode(b)),
            Value::Date(d) => Json::String(d.to_string()),
            Value::Time(t) => Json::String(t.to_string()),
            Value::Timestamp(ts) => Json::String(ts.to_string()),
            Value::Uuid(u) => Json::String(u.to_string()),
            Value::Map(m) => Json::Object(
                m.iter()
                    .map(|(k, v)| {
                        let v = v.as_ref().map_or(Json::Null, |s| Json::String(s.clone()));
                        (k.clone(), v)
                    })
                    .collect(),
            ),
        }
    }
}

/// Text form used when a value has to be embedded as a quoted literal.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("NULL"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Integer(i) => write!(f, "{}", i),
            Value::BigInteger(i) => write!(f, "{}", i),
            Value::Float(v) => write!(f, "{}", v),
            Value::Decimal(d) => write!(f, "{}", d),
            Value::Text(s) => f.write_str(s),
            Value::Bytes(b) => f.write_str(&hex::encode_upper(b)),
            Value::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Value::Time(t) => write!(f, "{}", t.format("%H:%M:%S%.f")),
            Value::Timestamp(ts) => write!(f, "{}", ts.format("%Y-%m-%d %H:%M:%S%.f")),
            Value::Uuid(u) => write!(f, "{}", u),
            Value::Map(_) => write!(f, "{}", self.to_json()),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Integer(i64::from(v))
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Bytes(v)
    }
}

impl From<&[u8]> for Value {
    fn from(v: &[u8]) -> Self {
        Value::Bytes(v.to_vec())
    }
}

impl From<BigInt> for Value {
    fn from(v: BigInt) -> Self {
        Value::BigInteger(v)
    }
}

impl From<Decimal> for Value {
    fn from(v: Decimal) -> Self {
        Value::Decimal(v)
    }
}

impl From<NaiveDate> for Value {
    fn from(v: NaiveDate) -> Self {
        Value::Date(v)
    }
}

impl From<NaiveTime> for Value {
    fn from(v: NaiveTime) -> Self {
        Value::Time(v)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(v: NaiveDateTime) -> Self {
        Value::Timestamp(v)
    }
}

impl From<Uuid> for Value {
    fn from(v: Uuid) -> Self {
        Value::Uuid(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_null() {
        assert!(Value::Null.is_null());
        assert!(!Value::Integer(0).is_null());
        assert!(!Value::Text(String::new()).is_null());
    }

    #[test]
    fn test_from_option() {
        let v: Value = Option::<i64>::None.into();
        assert_eq!(v, Value::Null);
        let v: Value = Some("abc").into();
        assert_eq!(v, Value::Text("abc".to_string()));
    }

    #[test]
    fn test_display_temporal() {
        let d = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        assert_eq!(Value::Date(d).to_string(), "2024-02-29");
        let ts = d.and_hms_micro_opt(13, 5, 9, 120_000).unwrap();
        assert_eq!(Value::Timestamp(ts).to_string(), "2024-02-29 13:05:09.120");
    }

    #[test]
    fn test_to_json_keeps_decimal_precision() {
        let d: Decimal = "12345678901234567890.123".parse().unwrap();
        assert_eq!(
            Value::Decimal(d).to_json(),
            serde_json::Value::String("12345678901234567890.123".to_string())
        );
    }

    #[test]
    fn test_map_to_json() {
        let mut m = BTreeMap::new();
        m.insert("a".to_string(), Some("1".to_string()));
        m.insert("b".to_string(), None);
        let json = Value::Map(m).to_json();
        assert_eq!(json["a"], "1");
        assert!(json["b"].is_null());
    }
}
