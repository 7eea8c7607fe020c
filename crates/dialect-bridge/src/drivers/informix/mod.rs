//! IBM Informix driver.

mod dialect;

pub use dialect::InformixDialect;
