//! Sybase ASE driver.

mod dialect;

pub use dialect::SybaseDialect;
