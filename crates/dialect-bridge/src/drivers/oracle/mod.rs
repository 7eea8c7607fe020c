//! Oracle driver.
//!
//! - [`OracleDialect`]: hook overrides for Oracle Database

mod dialect;

pub use dialect::OracleDialect;
