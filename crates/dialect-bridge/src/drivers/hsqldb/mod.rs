//! HyperSQL driver.

mod dialect;

pub use dialect::HsqldbDialect;
