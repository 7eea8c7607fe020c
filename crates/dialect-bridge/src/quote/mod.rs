//! Quoting and escaping engine.
//!
//! Converts a host [`Value`] plus an optional column hint into a SQL literal
//! fragment for direct embedding in statement text. Rules are applied in
//! priority order:
//!
//! 1. NULL renders as the dialect's NULL literal.
//! 2. Booleans render as the dialect's true/false literals, or bare `1`/`0`
//!    under an integer hint.
//! 3. Bytes (or text under a binary hint) render as uppercase hex inside the
//!    dialect's binary delimiters, chunked where the dialect caps literal length.
//! 4. Text renders single-quoted with embedded quotes doubled.
//! 5. Numeric-looking text under a numeric hint renders bare.
//! 6. Everything else is stringified and then quoted as text.
//!
//! Every chunk of a binary literal is closed before the next one is opened.

use std::fmt;
use std::str::FromStr;

use crate::core::codec;
use crate::core::traits::Dialect;
use crate::core::value::Value;
use crate::error::BridgeError;

/// Declared kind of the column a literal is destined for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnHint {
    Integer,
    Float,
    Decimal,
    Boolean,
    Text,
    Binary,
    Date,
    Time,
    Timestamp,
}

impl ColumnHint {
    pub fn is_numeric(self) -> bool {
        matches!(self, ColumnHint::Integer | ColumnHint::Float | ColumnHint::Decimal)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ColumnHint::Integer => "integer",
            ColumnHint::Float => "float",
            ColumnHint::Decimal => "decimal",
            ColumnHint::Boolean => "boolean",
            ColumnHint::Text => "text",
            ColumnHint::Binary => "binary",
            ColumnHint::Date => "date",
            ColumnHint::Time => "time",
            ColumnHint::Timestamp => "timestamp",
        }
    }
}

impl fmt::Display for ColumnHint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ColumnHint {
    type Err = BridgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "integer" | "int" => Ok(ColumnHint::Integer),
            "float" | "double" => Ok(ColumnHint::Float),
            "decimal" | "numeric" => Ok(ColumnHint::Decimal),
            "boolean" | "bool" => Ok(ColumnHint::Boolean),
            "text" | "string" => Ok(ColumnHint::Text),
            "binary" | "blob" => Ok(ColumnHint::Binary),
            "date" => Ok(ColumnHint::Date),
            "time" => Ok(ColumnHint::Time),
            "timestamp" | "datetime" => Ok(ColumnHint::Timestamp),
            other => Err(BridgeError::Config(format!("Unknown column hint: {}", other))),
        }
    }
}

/// Delimiters and chunking for binary literals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BinaryLiteral {
    pub prefix: &'static str,
    pub suffix: &'static str,
    /// Maximum bytes per literal chunk; `None` for unbounded.
    pub max_chunk_bytes: Option<usize>,
    /// Operator joining chunks.
    pub concat: &'static str,
}

/// Literal forms of a dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LiteralStyle {
    pub null_literal: &'static str,
    pub true_literal: &'static str,
    pub false_literal: &'static str,
    pub binary: BinaryLiteral,
    /// Backslash is an escape character inside string literals.
    pub escape_backslash: bool,
    /// Prefix non-ASCII string literals with `N`.
    pub national_prefix: bool,
}

impl LiteralStyle {
    pub const STANDARD: LiteralStyle = LiteralStyle {
        null_literal: "NULL",
        true_literal: "'t'",
        false_literal: "'f'",
        binary: BinaryLiteral {
            prefix: "X'",
            suffix: "'",
            max_chunk_bytes: None,
            concat: " || ",
        },
        escape_backslash: false,
        national_prefix: false,
    };

    /// Bare `1`/`0` booleans.
    pub const fn with_numeric_booleans(self) -> LiteralStyle {
        LiteralStyle {
            true_literal: "1",
            false_literal: "0",
            ..self
        }
    }

    /// `TRUE`/`FALSE` keywords.
    pub const fn with_keyword_booleans(self) -> LiteralStyle {
        LiteralStyle {
            true_literal: "TRUE",
            false_literal: "FALSE",
            ..self
        }
    }

    pub const fn with_binary(self, binary: BinaryLiteral) -> LiteralStyle {
        LiteralStyle { binary, ..self }
    }
}

/// Session-level quoting switches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QuoteOptions {
    /// Emit JDBC escape syntax (`{d '...'}`) for temporal values.
    pub escape_processing: bool,
}

/// Quote a value with default options.
pub fn quote_value<D: Dialect + ?Sized>(dialect: &D, value: &Value, hint: Option<ColumnHint>) -> String {
    quote_value_with(dialect, value, hint, QuoteOptions::default())
}

/// Quote a value for `dialect`.
pub fn quote_value_with<D: Dialect + ?Sized>(
    dialect: &D,
    value: &Value,
    hint: Option<ColumnHint>,
    options: QuoteOptions,
) -> String {
    let style = dialect.literal_style();
    match value {
        Value::Null => style.null_literal.to_string(),
        Value::Bool(b) => quote_bool(&style, *b, hint),
        Value::Bytes(bytes) => quote_binary(&style.binary, bytes),
        Value::Text(text) if hint == Some(ColumnHint::Binary) => {
            quote_binary(&style.binary, text.as_bytes())
        }
        Value::Text(text) => quote_text_hinted(&style, text, hint),
        Value::Integer(_) | Value::BigInteger(_) | Value::Float(_)
            if hint == Some(ColumnHint::Text) =>
        {
            quote_text(&style, &value.to_string())
        }
        Value::Integer(i) => i.to_string(),
        Value::BigInteger(big) => big.to_string(),
        Value::Float(f) if f.is_finite() => f.to_string(),
        Value::Date(d) if options.escape_processing => format!("{{d '{}'}}", d.format("%Y-%m-%d")),
        Value::Time(t) if options.escape_processing => format!("{{t '{}'}}", t.format("%H:%M:%S%.f")),
        Value::Timestamp(ts) if options.escape_processing => {
            format!("{{ts '{}'}}", ts.format("%Y-%m-%d %H:%M:%S%.f"))
        }
        Value::Date(d) => dialect.quote_date(*d),
        Value::Time(t) => dialect.quote_time(*t),
        Value::Timestamp(ts) => dialect.quote_timestamp(*ts),
        other => quote_text_hinted(&style, &other.to_string(), hint),
    }
}

fn quote_bool(style: &LiteralStyle, value: bool, hint: Option<ColumnHint>) -> String {
    let literal = match (hint, value) {
        (Some(ColumnHint::Integer), true) => "1",
        (Some(ColumnHint::Integer), false) => "0",
        (_, true) => style.true_literal,
        (_, false) => style.false_literal,
    };
    literal.to_string()
}

fn quote_text_hinted(style: &LiteralStyle, text: &str, hint: Option<ColumnHint>) -> String {
    match hint {
        Some(h) if h.is_numeric() && looks_numeric(text) => text.trim().to_string(),
        _ => quote_text(style, text),
    }
}

/// Single-quote `text`, doubling embedded quotes.
///
/// `'` is ASCII, so it never occurs inside a multi-byte UTF-8 sequence and
/// every other byte passes through untouched.
pub fn quote_text(style: &LiteralStyle, text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 3);
    if style.national_prefix && !text.is_ascii() {
        out.push('N');
    }
    out.push('\'');
    for c in text.chars() {
        match c {
            '\'' => out.push_str("''"),
            '\\' if style.escape_backslash => out.push_str("\\\\"),
            _ => out.push(c),
        }
    }
    out.push('\'');
    out
}

/// Hex-encode `bytes` into one or more closed binary literals.
pub fn quote_binary(binary: &BinaryLiteral, bytes: &[u8]) -> String {
    codec::hex_chunks(bytes, binary.max_chunk_bytes)
        .iter()
        .map(|chunk| format!("{}{}{}", binary.prefix, chunk, binary.suffix))
        .collect::<Vec<_>>()
        .join(binary.concat)
}

/// Whether `text` reads as a plain decimal or scientific number.
pub fn looks_numeric(text: &str) -> bool {
    let t = text.trim();
    let body = t.strip_prefix(['-', '+']).unwrap_or(t);
    if body.is_empty() || !body.starts_with(|c: char| c.is_ascii_digit() || c == '.') {
        return false;
    }
    body.bytes()
        .all(|b| b.is_ascii_digit() || matches!(b, b'.' | b'e' | b'E' | b'-' | b'+'))
        && t.parse::<f64>().is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};
    use proptest::prelude::*;
    use rust_decimal::Decimal;

    struct Plain;

    impl Dialect for Plain {
        fn name(&self) -> &str {
            "plain"
        }
    }

    struct Chunked;

    impl Dialect for Chunked {
        fn name(&self) -> &str {
            "chunked"
        }

        fn literal_style(&self) -> LiteralStyle {
            LiteralStyle::STANDARD.with_binary(BinaryLiteral {
                prefix: "BLOB(X'",
                suffix: "')",
                max_chunk_bytes: Some(4),
                concat: " || ",
            })
        }
    }

    fn unquote(literal: &str) -> Option<String> {
        let inner = literal.strip_prefix('\'')?.strip_suffix('\'')?;
        Some(inner.replace("''", "'"))
    }

    fn hex_payload(literal: &str, binary: &BinaryLiteral) -> String {
        literal
            .split(binary.concat)
            .map(|chunk| {
                chunk
                    .strip_prefix(binary.prefix)
                    .and_then(|c| c.strip_suffix(binary.suffix))
                    .unwrap_or_else(|| panic!("unbalanced chunk {}", chunk))
                    .to_string()
            })
            .collect()
    }

    // =========================================================================
    // Priority rules
    // =========================================================================

    #[test]
    fn test_null() {
        assert_eq!(quote_value(&Plain, &Value::Null, Some(ColumnHint::Integer)), "NULL");
    }

    #[test]
    fn test_boolean_integer_hint() {
        assert_eq!(quote_value(&Plain, &Value::Bool(true), Some(ColumnHint::Integer)), "1");
        assert_eq!(quote_value(&Plain, &Value::Bool(false), Some(ColumnHint::Integer)), "0");
        assert_eq!(quote_value(&Plain, &Value::Bool(true), None), "'t'");
        assert_eq!(quote_value(&Plain, &Value::Bool(false), Some(ColumnHint::Boolean)), "'f'");
    }

    #[test]
    fn test_text_doubling() {
        assert_eq!(quote_value(&Plain, &Value::from("O'Brien"), None), "'O''Brien'");
        assert_eq!(quote_value(&Plain, &Value::from(""), None), "''");
        assert_eq!(quote_value(&Plain, &Value::from("''"), None), "''''''");
    }

    #[test]
    fn test_multibyte_text_preserved() {
        assert_eq!(quote_value(&Plain, &Value::from("naïve 'ü'"), None), "'naïve ''ü'''");
    }

    #[test]
    fn test_numeric_text_under_numeric_hint() {
        assert_eq!(quote_value(&Plain, &Value::from("42"), Some(ColumnHint::Integer)), "42");
        assert_eq!(quote_value(&Plain, &Value::from("-1.5e3"), Some(ColumnHint::Float)), "-1.5e3");
        assert_eq!(quote_value(&Plain, &Value::from("42"), None), "'42'");
        assert_eq!(
            quote_value(&Plain, &Value::from("42; DROP"), Some(ColumnHint::Integer)),
            "'42; DROP'"
        );
    }

    #[test]
    fn test_numbers() {
        assert_eq!(quote_value(&Plain, &Value::Integer(-3), None), "-3");
        assert_eq!(quote_value(&Plain, &Value::Float(2.5), None), "2.5");
        assert_eq!(quote_value(&Plain, &Value::Integer(7), Some(ColumnHint::Text)), "'7'");
        assert_eq!(quote_value(&Plain, &Value::Float(f64::NAN), None), "'NaN'");
    }

    #[test]
    fn test_decimal_fallback() {
        let d: Decimal = "12.50".parse().unwrap();
        assert_eq!(quote_value(&Plain, &Value::Decimal(d), None), "'12.50'");
        assert_eq!(quote_value(&Plain, &Value::Decimal(d), Some(ColumnHint::Decimal)), "12.50");
    }

    #[test]
    fn test_temporal_defaults_and_escapes() {
        let date = Value::Date(NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
        let time = Value::Time(NaiveTime::from_hms_opt(10, 30, 0).unwrap());
        assert_eq!(quote_value(&Plain, &date, None), "'2024-02-29'");
        assert_eq!(quote_value(&Plain, &time, None), "'10:30:00'");

        let escaped = QuoteOptions {
            escape_processing: true,
        };
        assert_eq!(quote_value_with(&Plain, &date, None, escaped), "{d '2024-02-29'}");
        assert_eq!(quote_value_with(&Plain, &time, None, escaped), "{t '10:30:00'}");
    }

    // =========================================================================
    // Binary literals
    // =========================================================================

    #[test]
    fn test_binary_single_literal() {
        assert_eq!(quote_value(&Plain, &Value::Bytes(vec![0xde, 0xad]), None), "X'DEAD'");
        assert_eq!(quote_value(&Plain, &Value::Bytes(vec![]), None), "X''");
        assert_eq!(quote_value(&Plain, &Value::from("AB"), Some(ColumnHint::Binary)), "X'4142'");
    }

    #[test]
    fn test_binary_chunks_are_closed() {
        let lit = quote_value(&Chunked, &Value::Bytes(vec![1, 2, 3, 4, 5, 6]), None);
        assert_eq!(lit, "BLOB(X'01020304') || BLOB(X'0506')");
    }

    #[test]
    fn test_national_and_backslash() {
        let mssql = LiteralStyle {
            national_prefix: true,
            ..LiteralStyle::STANDARD
        };
        assert_eq!(quote_text(&mssql, "plain"), "'plain'");
        assert_eq!(quote_text(&mssql, "Zürich"), "N'Zürich'");

        let mysql = LiteralStyle {
            escape_backslash: true,
            ..LiteralStyle::STANDARD
        };
        assert_eq!(quote_text(&mysql, "a\\b'c"), "'a\\\\b''c'");
    }

    #[test]
    fn test_looks_numeric() {
        assert!(looks_numeric("0"));
        assert!(looks_numeric(" 3.14 "));
        assert!(looks_numeric("+1e10"));
        assert!(!looks_numeric("inf"));
        assert!(!looks_numeric("NaN"));
        assert!(!looks_numeric(""));
        assert!(!looks_numeric("1-2"));
    }

    // =========================================================================
    // Properties
    // =========================================================================

    proptest! {
        #[test]
        fn prop_text_round_trip(text in ".*") {
            let lit = quote_value(&Plain, &Value::Text(text.clone()), None);
            prop_assert_eq!(unquote(&lit), Some(text));
        }

        #[test]
        fn prop_text_with_quotes_round_trip(parts in proptest::collection::vec("[a-z]{0,4}", 0..8)) {
            let text = parts.join("'");
            let lit = quote_value(&Plain, &Value::Text(text.clone()), Some(ColumnHint::Text));
            prop_assert_eq!(unquote(&lit), Some(text));
        }

        #[test]
        fn prop_binary_payload(bytes in proptest::collection::vec(any::<u8>(), 0..64)) {
            let binary = Chunked.literal_style().binary;
            let lit = quote_value(&Chunked, &Value::Bytes(bytes.clone()), None);
            let payload = hex_payload(&lit, &binary);
            prop_assert_eq!(payload.len(), bytes.len() * 2);
            prop_assert_eq!(hex::decode(&payload).unwrap(), bytes);
        }
    }
}
