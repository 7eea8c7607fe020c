//! IBM DB2 driver.

mod dialect;

pub use dialect::Db2Dialect;
