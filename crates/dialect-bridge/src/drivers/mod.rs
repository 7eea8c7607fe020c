//! Dialect implementations, one module per backend.
//!
//! Each driver module provides a unit struct implementing
//! [`Dialect`](crate::core::traits::Dialect). Most dialects override only a
//! handful of hooks; everything else comes from the trait defaults.
//!
//! # Static dispatch
//!
//! [`DialectImpl`] wraps every built-in dialect in one enum so that callers
//! holding a concrete dialect avoid vtable dispatch. The match arms are
//! generated by a local macro rather than written out per hook.
//!
//! # Adding New Databases
//!
//! 1. Create a new module under `drivers/` with a `dialect.rs`
//! 2. Implement `Dialect`, overriding only the hooks where the backend diverges
//! 3. Add an enum variant to `DialectImpl` and its names to [`BUILTIN_DIALECTS`]

pub mod db2;
pub mod derby;
pub mod firebird;
pub mod h2;
pub mod hsqldb;
pub mod informix;
pub mod mssql;
pub mod mysql;
pub mod oracle;
pub mod postgres;
pub mod sqlite;
pub mod sybase;

pub use db2::Db2Dialect;
pub use derby::DerbyDialect;
pub use firebird::FirebirdDialect;
pub use h2::H2Dialect;
pub use hsqldb::HsqldbDialect;
pub use informix::InformixDialect;
pub use mssql::MssqlDialect;
pub use mysql::MysqlDialect;
pub use oracle::OracleDialect;
pub use postgres::PostgresDialect;
pub use sqlite::SqliteDialect;
pub use sybase::SybaseDialect;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use crate::config::GeneratedKeyFormat;
use crate::core::cursor::RowCursor;
use crate::core::identifier::{IdentifierCase, IdentifierQuote};
use crate::core::traits::Dialect;
use crate::core::types::{CatalogColumn, ColumnDescriptor, SqlType, TableEntry};
use crate::core::value::Value;
use crate::decode::DecoderKind;
use crate::error::{BridgeError, DriverFault, Result};
use crate::quote::{ColumnHint, LiteralStyle};
use crate::savepoint::SavepointStrategy;

/// Canonical dialect names with their accepted aliases.
pub const BUILTIN_DIALECTS: &[(&str, &[&str])] = &[
    ("db2", &["ibm_db2", "as400"]),
    ("derby", &["javadb"]),
    ("firebird", &["firebirdsql"]),
    ("h2", &[]),
    ("hsqldb", &["hsql", "hypersql"]),
    ("informix", &[]),
    ("mssql", &["sqlserver", "sql_server"]),
    ("mysql", &["mariadb"]),
    ("oracle", &["oracle_enhanced"]),
    ("postgres", &["postgresql", "pg"]),
    ("sqlite3", &["sqlite"]),
    ("sybase", &["ase", "jtds_sybase"]),
];

/// Enum-based static dispatch for dialects.
#[derive(Debug, Clone)]
pub enum DialectImpl {
    Db2(Db2Dialect),
    Derby(DerbyDialect),
    Firebird(FirebirdDialect),
    H2(H2Dialect),
    Hsqldb(HsqldbDialect),
    Informix(InformixDialect),
    Mssql(MssqlDialect),
    Mysql(MysqlDialect),
    Oracle(OracleDialect),
    Postgres(PostgresDialect),
    Sqlite(SqliteDialect),
    Sybase(SybaseDialect),
}

macro_rules! dispatch {
    ($self:ident, $d:ident => $body:expr) => {
        match $self {
            DialectImpl::Db2($d) => $body,
            DialectImpl::Derby($d) => $body,
            DialectImpl::Firebird($d) => $body,
            DialectImpl::H2($d) => $body,
            DialectImpl::Hsqldb($d) => $body,
            DialectImpl::Informix($d) => $body,
            DialectImpl::Mssql($d) => $body,
            DialectImpl::Mysql($d) => $body,
            DialectImpl::Oracle($d) => $body,
            DialectImpl::Postgres($d) => $body,
            DialectImpl::Sqlite($d) => $body,
            DialectImpl::Sybase($d) => $body,
        }
    };
}

impl Dialect for DialectImpl {
    fn name(&self) -> &str {
        dispatch!(self, d => d.name())
    }

    fn identifier_case(&self) -> IdentifierCase {
        dispatch!(self, d => d.identifier_case())
    }

    fn identifier_quote(&self) -> IdentifierQuote {
        dispatch!(self, d => d.identifier_quote())
    }

    fn identifier_to_external(&self, value: &str) -> String {
        dispatch!(self, d => d.identifier_to_external(value))
    }

    fn identifier_to_internal(&self, value: &str) -> String {
        dispatch!(self, d => d.identifier_to_internal(value))
    }

    fn quote_ident(&self, name: &str) -> Result<String> {
        dispatch!(self, d => d.quote_ident(name))
    }

    fn reconstruct_type_name(&self, column: &CatalogColumn) -> String {
        dispatch!(self, d => d.reconstruct_type_name(column))
    }

    fn is_system_table(&self, table: &TableEntry) -> bool {
        dispatch!(self, d => d.is_system_table(table))
    }

    fn filter_system_tables(&self, table: &TableEntry, include_system: bool) -> bool {
        dispatch!(self, d => d.filter_system_tables(table, include_system))
    }

    fn supports_schemas(&self) -> bool {
        dispatch!(self, d => d.supports_schemas())
    }

    fn reclassify(&self, column: &ColumnDescriptor) -> SqlType {
        dispatch!(self, d => d.reclassify(column))
    }

    fn decode_override(&self, column: &ColumnDescriptor) -> Option<DecoderKind> {
        dispatch!(self, d => d.decode_override(column))
    }

    fn declared_types_unreliable(&self) -> bool {
        dispatch!(self, d => d.declared_types_unreliable())
    }

    fn literal_style(&self) -> LiteralStyle {
        dispatch!(self, d => d.literal_style())
    }

    fn quote_date(&self, date: NaiveDate) -> String {
        dispatch!(self, d => d.quote_date(date))
    }

    fn quote_time(&self, time: NaiveTime) -> String {
        dispatch!(self, d => d.quote_time(time))
    }

    fn quote_timestamp(&self, ts: NaiveDateTime) -> String {
        dispatch!(self, d => d.quote_timestamp(ts))
    }

    fn quote_literal(&self, value: &Value, hint: Option<ColumnHint>) -> String {
        dispatch!(self, d => d.quote_literal(value, hint))
    }

    fn savepoint_strategy(&self) -> SavepointStrategy {
        dispatch!(self, d => d.savepoint_strategy())
    }

    fn savepoint_sql(&self, name: &str) -> String {
        dispatch!(self, d => d.savepoint_sql(name))
    }

    fn rollback_to_savepoint_sql(&self, name: &str) -> String {
        dispatch!(self, d => d.rollback_to_savepoint_sql(name))
    }

    fn release_savepoint_sql(&self, name: &str) -> Option<String> {
        dispatch!(self, d => d.release_savepoint_sql(name))
    }

    fn known_driver_quirk(&self, fault: &DriverFault) -> Option<&'static str> {
        dispatch!(self, d => d.known_driver_quirk(fault))
    }

    fn extract_generated_key(
        &self,
        cursor: &mut dyn RowCursor,
        format: GeneratedKeyFormat,
    ) -> Result<Value> {
        dispatch!(self, d => d.extract_generated_key(cursor, format))
    }
}

impl DialectImpl {
    /// Canonical name for a dialect name or alias, case-insensitively.
    pub fn canonical_name(db_type: &str) -> Option<&'static str> {
        let wanted = db_type.trim().to_lowercase();
        BUILTIN_DIALECTS
            .iter()
            .find(|(name, aliases)| *name == wanted || aliases.contains(&wanted.as_str()))
            .map(|(name, _)| *name)
    }

    /// Create a dialect implementation from a database type string.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::UnknownDialect`] if the name is not recognized.
    pub fn from_db_type(db_type: &str) -> Result<Self> {
        let dialect = match Self::canonical_name(db_type) {
            Some("db2") => DialectImpl::Db2(Db2Dialect::new()),
            Some("derby") => DialectImpl::Derby(DerbyDialect::new()),
            Some("firebird") => DialectImpl::Firebird(FirebirdDialect::new()),
            Some("h2") => DialectImpl::H2(H2Dialect::new()),
            Some("hsqldb") => DialectImpl::Hsqldb(HsqldbDialect::new()),
            Some("informix") => DialectImpl::Informix(InformixDialect::new()),
            Some("mssql") => DialectImpl::Mssql(MssqlDialect::new()),
            Some("mysql") => DialectImpl::Mysql(MysqlDialect::new()),
            Some("oracle") => DialectImpl::Oracle(OracleDialect::new()),
            Some("postgres") => DialectImpl::Postgres(PostgresDialect::new()),
            Some("sqlite3") => DialectImpl::Sqlite(SqliteDialect::new()),
            Some("sybase") => DialectImpl::Sybase(SybaseDialect::new()),
            _ => return Err(BridgeError::UnknownDialect(db_type.to_string())),
        };
        Ok(dialect)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_builtin_resolves_to_itself() {
        for (name, aliases) in BUILTIN_DIALECTS {
            let dialect = DialectImpl::from_db_type(name).unwrap();
            assert_eq!(dialect.name(), *name);
            for alias in *aliases {
                assert_eq!(DialectImpl::from_db_type(alias).unwrap().name(), *name);
            }
        }
    }

    #[test]
    fn test_dialect_impl_from_db_type() {
        assert!(DialectImpl::from_db_type("SQLServer").is_ok());
        assert!(DialectImpl::from_db_type(" PostgreSQL ").is_ok());
        assert!(matches!(
            DialectImpl::from_db_type("unknown"),
            Err(BridgeError::UnknownDialect(_))
        ));
    }

    #[test]
    fn test_dialect_impl_dispatch() {
        let dialect = DialectImpl::from_db_type("mssql").unwrap();
        assert_eq!(dialect.quote_ident("table").unwrap(), "[table]");
        assert_eq!(dialect.savepoint_strategy(), SavepointStrategy::Emulated);

        let dialect = DialectImpl::from_db_type("postgres").unwrap();
        assert_eq!(dialect.quote_ident("table").unwrap(), "\"table\"");
        assert_eq!(dialect.identifier_case(), IdentifierCase::Lower);
    }

    #[test]
    fn test_boolean_quoting_per_dialect() {
        let expected = [
            ("postgres", "'t'"),
            ("sqlite3", "'t'"),
            ("mssql", "1"),
            ("oracle", "1"),
            ("h2", "TRUE"),
        ];
        for (name, literal) in expected {
            let dialect = DialectImpl::from_db_type(name).unwrap();
            assert_eq!(dialect.quote_literal(&Value::Bool(true), None), literal, "{}", name);
            assert_eq!(
                dialect.quote_literal(&Value::Bool(true), Some(ColumnHint::Integer)),
                "1",
                "{}",
                name
            );
        }
    }

    #[test]
    fn test_upper_case_dialects_fold_identifiers() {
        for name in ["oracle", "db2", "derby", "h2", "hsqldb", "firebird"] {
            let dialect = DialectImpl::from_db_type(name).unwrap();
            assert_eq!(dialect.identifier_to_external("LINE_ID"), "line_id", "{}", name);
            assert_eq!(dialect.identifier_to_internal("line_id"), "LINE_ID", "{}", name);
            assert_eq!(dialect.identifier_to_external("LineId"), "LineId", "{}", name);
        }
    }
}
