//! Firebird driver.

mod dialect;

pub use dialect::FirebirdDialect;
