//! Microsoft SQL Server driver.
//!
//! - [`MssqlDialect`]: hook overrides for SQL Server

mod dialect;

pub use dialect::MssqlDialect;
