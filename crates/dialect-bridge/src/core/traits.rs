//! The dialect hook contract.
//!
//! Every backend implements [`Dialect`]. The trait's default methods are the
//! shared, standard-SQL behavior; a backend overrides only the hooks where it
//! diverges, so most dialect modules are a handful of short methods.
//!
//! # Design Pattern
//!
//! - **Strategy**: each dialect is an interchangeable set of SQL rules
//! - **Template Method**: defaults such as [`Dialect::filter_system_tables`] are
//!   built from smaller hooks ([`Dialect::is_system_table`])
//!
//! Hooks that reach the driver return [`Result`]; a driver fault is tagged
//! with the dialect name and operation and never turned into `Value::Null`.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use num_bigint::BigInt;

use super::cursor::RowCursor;
use super::identifier::{self, IdentifierCase, IdentifierQuote};
use super::types::{CatalogColumn, ColumnDescriptor, SqlType, TableEntry};
use super::value::Value;
use crate::config::GeneratedKeyFormat;
use crate::decode::DecoderKind;
use crate::error::{BridgeError, DriverFault, Result};
use crate::quote::{self, ColumnHint, LiteralStyle};
use crate::savepoint::SavepointStrategy;

/// Backend-specific behavior consulted by decoders, the quoting engine and
/// the savepoint manager.
pub trait Dialect: Send + Sync {
    /// Stable dialect identifier (e.g. "oracle", "mssql", "sqlite3").
    fn name(&self) -> &str;

    // ===== Identifiers =====

    /// Case the backend stores unquoted identifiers in.
    fn identifier_case(&self) -> IdentifierCase {
        IdentifierCase::Upper
    }

    /// Delimiters for quoted identifiers.
    fn identifier_quote(&self) -> IdentifierQuote {
        IdentifierQuote::DoubleQuote
    }

    /// Fold a catalog identifier for the host.
    fn identifier_to_external(&self, value: &str) -> String {
        identifier::to_external(value, self.identifier_case())
    }

    /// Fold a host identifier for use inside a query.
    fn identifier_to_internal(&self, value: &str) -> String {
        identifier::to_internal(value, self.identifier_case())
    }

    /// Quote an identifier (table name, column name, etc.).
    fn quote_ident(&self, name: &str) -> Result<String> {
        identifier::quote_identifier(name, self.identifier_quote())
    }

    // ===== Catalog metadata =====

    /// Rebuild a SQL type string such as `VARCHAR(255)` from a catalog row.
    fn reconstruct_type_name(&self, column: &CatalogColumn) -> String {
        format_type_name(&column.type_name, column.precision, column.scale)
    }

    /// Whether a table belongs to a backend-internal schema.
    fn is_system_table(&self, _table: &TableEntry) -> bool {
        false
    }

    /// Keep or drop a table during enumeration.
    fn filter_system_tables(&self, table: &TableEntry, include_system: bool) -> bool {
        include_system || !self.is_system_table(table)
    }

    /// Whether schema-qualified lookups are meaningful.
    fn supports_schemas(&self) -> bool {
        true
    }

    // ===== Decoding =====

    /// Reclassify a column's declared type before decoder selection.
    fn reclassify(&self, column: &ColumnDescriptor) -> SqlType {
        column.sql_type
    }

    /// Pick a decoder for a column ahead of the generic mapping.
    ///
    /// `None` falls through to the generic mapping. `Some(DecoderKind::Null)`
    /// declares a column that always decodes as NULL.
    fn decode_override(&self, _column: &ColumnDescriptor) -> Option<DecoderKind> {
        None
    }

    /// Whether the driver reports per-row types, so that columns must be
    /// reclassified on every row rather than once per result shape.
    fn declared_types_unreliable(&self) -> bool {
        false
    }

    // ===== Literals =====

    /// NULL, boolean, string and binary literal forms.
    fn literal_style(&self) -> LiteralStyle {
        LiteralStyle::STANDARD
    }

    fn quote_date(&self, date: NaiveDate) -> String {
        format!("'{}'", date.format("%Y-%m-%d"))
    }

    fn quote_time(&self, time: NaiveTime) -> String {
        format!("'{}'", time.format("%H:%M:%S%.f"))
    }

    fn quote_timestamp(&self, ts: NaiveDateTime) -> String {
        format!("'{}'", ts.format("%Y-%m-%d %H:%M:%S%.f"))
    }

    /// Convert a value into a SQL literal fragment.
    fn quote_literal(&self, value: &Value, hint: Option<ColumnHint>) -> String {
        quote::quote_value(self, value, hint)
    }

    // ===== Savepoints =====

    fn savepoint_strategy(&self) -> SavepointStrategy {
        SavepointStrategy::Native
    }

    fn savepoint_sql(&self, name: &str) -> String {
        format!("SAVEPOINT {}", name)
    }

    fn rollback_to_savepoint_sql(&self, name: &str) -> String {
        format!("ROLLBACK TO SAVEPOINT {}", name)
    }

    /// `None` when the backend has no release statement.
    fn release_savepoint_sql(&self, name: &str) -> Option<String> {
        Some(format!("RELEASE SAVEPOINT {}", name))
    }

    /// Name a known driver defect carried by `fault`, if it is one.
    ///
    /// Match on a stable vendor code or message, never on broad patterns.
    fn known_driver_quirk(&self, _fault: &DriverFault) -> Option<&'static str> {
        None
    }

    // ===== Generated keys =====

    /// Read the generated key from the first column of a generated-keys row.
    fn extract_generated_key(
        &self,
        cursor: &mut dyn RowCursor,
        format: GeneratedKeyFormat,
    ) -> Result<Value> {
        let raw = cursor
            .read_text(1)
            .map_err(|e| BridgeError::retrieval(self.name(), "extract generated key", e))?;
        Ok(parse_generated_key(raw.as_deref(), format))
    }
}

/// Append `(precision[,scale])` to a type name when the catalog reports one.
///
/// Names that already carry a parenthesized suffix are returned unchanged.
pub fn format_type_name(type_name: &str, precision: Option<i64>, scale: Option<i32>) -> String {
    if type_name.contains('(') {
        return type_name.to_string();
    }
    match (precision, scale) {
        (Some(p), Some(s)) if p > 0 && s > 0 => format!("{}({},{})", type_name, p, s),
        (Some(p), _) if p > 0 => format!("{}({})", type_name, p),
        _ => type_name.to_string(),
    }
}

/// [`format_type_name`], except for type names listed in `bare`, which never
/// carry a size suffix on this backend.
pub fn format_type_name_except(column: &CatalogColumn, bare: &[&str]) -> String {
    if bare.iter().any(|b| b.eq_ignore_ascii_case(column.type_name.trim())) {
        return column.type_name.clone();
    }
    format_type_name(&column.type_name, column.precision, column.scale)
}

/// Interpret a generated key reported as text.
///
/// Purely numeric keys become integers. Anything else (a row-identifier
/// token, for instance) is returned as text or NULL according to `format`.
pub fn parse_generated_key(raw: Option<&str>, format: GeneratedKeyFormat) -> Value {
    let Some(raw) = raw else {
        return Value::Null;
    };
    let trimmed = raw.trim();
    let digits = trimmed.strip_prefix('-').unwrap_or(trimmed);
    if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
        if let Ok(i) = trimmed.parse::<i64>() {
            return Value::Integer(i);
        }
        if let Ok(big) = trimmed.parse::<BigInt>() {
            return Value::BigInteger(big);
        }
    }
    match format {
        GeneratedKeyFormat::Null => Value::Null,
        GeneratedKeyFormat::Text => Value::Text(raw.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Standard;

    impl Dialect for Standard {
        fn name(&self) -> &str {
            "standard"
        }
    }

    #[test]
    fn test_format_type_name() {
        assert_eq!(format_type_name("VARCHAR", Some(255), None), "VARCHAR(255)");
        assert_eq!(format_type_name("NUMERIC", Some(10), Some(2)), "NUMERIC(10,2)");
        assert_eq!(format_type_name("NUMERIC", Some(10), Some(0)), "NUMERIC(10)");
        assert_eq!(format_type_name("DATE", None, None), "DATE");
        assert_eq!(format_type_name("INT", Some(0), None), "INT");
        assert_eq!(format_type_name("TIMESTAMP(6)", Some(26), Some(6)), "TIMESTAMP(6)");
    }

    #[test]
    fn test_format_type_name_except() {
        let col = CatalogColumn::new("c", "int", Some(10), Some(0));
        assert_eq!(format_type_name_except(&col, &["INT"]), "int");
        let col = CatalogColumn::new("c", "varchar", Some(10), None);
        assert_eq!(format_type_name_except(&col, &["INT"]), "varchar(10)");
    }

    #[test]
    fn test_parse_generated_key_numeric() {
        assert_eq!(parse_generated_key(Some("42"), GeneratedKeyFormat::Null), Value::Integer(42));
        assert_eq!(parse_generated_key(Some(" -7 "), GeneratedKeyFormat::Null), Value::Integer(-7));
        let big = parse_generated_key(Some("123456789012345678901234"), GeneratedKeyFormat::Null);
        assert!(matches!(big, Value::BigInteger(_)));
    }

    #[test]
    fn test_parse_generated_key_row_identifier() {
        let rowid = Some("AAAR3sAAEAAAACXAAA");
        assert_eq!(parse_generated_key(rowid, GeneratedKeyFormat::Null), Value::Null);
        assert_eq!(
            parse_generated_key(rowid, GeneratedKeyFormat::Text),
            Value::Text("AAAR3sAAEAAAACXAAA".to_string())
        );
        assert_eq!(parse_generated_key(None, GeneratedKeyFormat::Text), Value::Null);
        assert_eq!(parse_generated_key(Some("-"), GeneratedKeyFormat::Null), Value::Null);
    }

    #[test]
    fn test_default_hooks() {
        let d = Standard;
        assert!(d.supports_schemas());
        assert_eq!(d.identifier_to_external("ORDERS"), "orders");
        assert_eq!(d.identifier_to_internal("orders"), "ORDERS");
        assert_eq!(d.quote_ident("orders").unwrap(), "\"orders\"");
        assert_eq!(d.savepoint_strategy(), SavepointStrategy::Native);
        assert_eq!(d.release_savepoint_sql("sp1").as_deref(), Some("RELEASE SAVEPOINT sp1"));
        let t = TableEntry::new(None, Some("SYS"), "T");
        assert!(d.filter_system_tables(&t, false));
    }
}
