//! PostgreSQL driver.
//!
//! - [`PostgresDialect`]: hook overrides for PostgreSQL, including the
//!   composite column types (intervals, geometry, hstore) its driver reports
//!   as opaque objects

mod dialect;

pub use dialect::PostgresDialect;
