//! Core abstractions shared by every dialect.
//!
//! - [`value`]: host value model
//! - [`types`]: SQL type codes, column descriptors and catalog rows
//! - [`cursor`]: boundary traits implemented by the underlying driver
//! - [`codec`]: stream draining, hex and text-encoding helpers
//! - [`identifier`]: identifier validation, quoting and case folding
//! - [`traits`]: the [`Dialect`] hook contract
//! - [`catalog`]: dialect registry for dependency injection
//! - [`memory`]: in-memory cursor for tests and recorded fixtures
//!
//! # Design Patterns
//!
//! - **Strategy**: each backend supplies a `Dialect`
//! - **Template Method**: default trait methods carry the generic behavior and
//!   dialects override only where their backend diverges

pub mod catalog;
pub mod codec;
pub mod cursor;
pub mod identifier;
pub mod memory;
pub mod traits;
pub mod types;
pub mod value;

pub use catalog::DialectCatalog;
pub use cursor::{CharStream, DriverDate, DriverObject, DriverStream, ResultMetadata, RowCursor, XmlHandle};
pub use identifier::{IdentifierCase, IdentifierQuote};
pub use memory::{Fixture, MemoryCell, MemoryCursor};
pub use traits::Dialect;
pub use types::{CatalogColumn, ColumnDescriptor, SqlType, TableEntry};
pub use value::Value;
