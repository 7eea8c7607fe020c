//! # dialect-bridge
//!
//! Driver adaptation layer for JDBC-style database connections.
//!
//! The library sits between a generic SQL execution layer and a vendor
//! driver and smooths over the differences between twelve backends:
//!
//! - **Column decoding**: result columns are classified once per result
//!   shape and decoded into host [`Value`]s
//! - **Dialect hooks**: identifier case, type-name reconstruction, system
//!   table filtering and driver quirks per backend
//! - **Savepoints**: native where the driver supports them, emulated with
//!   SQL statements where it does not
//! - **Quoting**: dialect-correct SQL literals for every value kind
//!
//! ## Example
//!
//! ```rust
//! use dialect_bridge::{AdapterConfig, DialectCatalog, Session, Value};
//!
//! let catalog = DialectCatalog::with_builtins();
//! let session = Session::open(&catalog, AdapterConfig::for_dialect("oracle")).unwrap();
//! assert_eq!(session.quote(&Value::Text("O'Brien".into()), None), "'O''Brien'");
//! assert_eq!(session.to_external("ORDER_ID"), "order_id");
//! ```

pub mod config;
pub mod core;
pub mod decode;
pub mod drivers;
pub mod error;
pub mod quote;
pub mod savepoint;
pub mod session;

// Re-exports for convenient access
pub use crate::config::{AdapterConfig, GeneratedKeyFormat};
pub use crate::core::{Dialect, DialectCatalog, SqlType, Value};
pub use decode::{DecodedRow, DecoderKind, DecoderRegistry, ResultDecoder};
pub use drivers::DialectImpl;
pub use error::{BridgeError, DriverFault, Result};
pub use quote::{ColumnHint, LiteralStyle, QuoteOptions};
pub use savepoint::{SavepointManager, SavepointStrategy, TransactionConnection};
pub use session::Session;
