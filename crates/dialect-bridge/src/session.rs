//! Per-connection session.
//!
//! A [`Session`] binds one dialect to one connection's worth of adapter
//! state: the decoder registry with its shape cache, and the savepoint
//! table. Sessions are not shared between threads; the
//! [`DialectCatalog`] they are opened from is.

use std::sync::Arc;

use tracing::debug;

use crate::config::AdapterConfig;
use crate::core::catalog::DialectCatalog;
use crate::core::cursor::{ResultMetadata, RowCursor};
use crate::core::traits::Dialect;
use crate::core::types::{CatalogColumn, TableEntry};
use crate::core::value::Value;
use crate::decode::{DecodedRow, DecoderRegistry, ResultDecoder};
use crate::error::{BridgeError, Result};
use crate::quote::{quote_value_with, ColumnHint, QuoteOptions};
use crate::savepoint::{SavepointManager, TransactionConnection};

/// Adapter state for one open connection.
pub struct Session {
    dialect: Arc<dyn Dialect>,
    config: AdapterConfig,
    registry: DecoderRegistry,
    savepoints: SavepointManager,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("dialect", &self.dialect.name())
            .field("config", &self.config)
            .field("registry", &self.registry)
            .field("savepoints", &self.savepoints)
            .finish()
    }
}

impl Session {
    /// Open a session for the configured dialect.
    ///
    /// Validates the configuration and marks the dialect's driver as loaded
    /// in `catalog`.
    pub fn open(catalog: &DialectCatalog, config: AdapterConfig) -> Result<Self> {
        config.validate()?;
        let dialect = catalog.require_dialect(&config.dialect)?;
        catalog.mark_loaded(&config.dialect)?;

        let registry = DecoderRegistry::new(config.encoding()?, config.shape_cache_capacity);
        debug!(
            "Opened {} session (encoding {}, shape cache {})",
            dialect.name(),
            config.default_encoding,
            config.shape_cache_capacity
        );

        Ok(Self {
            dialect,
            config,
            registry,
            savepoints: SavepointManager::new(),
        })
    }

    pub fn dialect(&self) -> &dyn Dialect {
        self.dialect.as_ref()
    }

    pub fn config(&self) -> &AdapterConfig {
        &self.config
    }

    // =========================================================================
    // Decoding
    // =========================================================================

    /// Decoder set for a result, reused across results of the same shape.
    pub fn prepare(&mut self, meta: &dyn ResultMetadata) -> Result<Arc<ResultDecoder>> {
        self.registry.prepare(self.dialect.as_ref(), meta)
    }

    /// Decode every remaining row of `cursor`.
    pub fn decode_all<C>(&mut self, cursor: &mut C) -> Result<Vec<DecodedRow>>
    where
        C: ResultMetadata + RowCursor,
    {
        let decoder = self.prepare(&*cursor)?;
        decoder.decode_all(self.dialect.as_ref(), cursor)
    }

    /// Drop cached result shapes.
    pub fn clear_cache(&mut self) {
        self.registry.clear();
    }

    /// Read the generated key from a generated-keys row.
    pub fn extract_generated_key(&self, cursor: &mut dyn RowCursor) -> Result<Value> {
        self.dialect
            .extract_generated_key(cursor, self.config.generated_keys)
    }

    // =========================================================================
    // Quoting and metadata
    // =========================================================================

    /// Render `value` as a SQL literal.
    pub fn quote(&self, value: &Value, hint: Option<ColumnHint>) -> String {
        let options = QuoteOptions {
            escape_processing: self.config.escape_processing,
        };
        quote_value_with(self.dialect.as_ref(), value, hint, options)
    }

    pub fn quote_ident(&self, name: &str) -> Result<String> {
        self.dialect.quote_ident(name)
    }

    /// Backend identifier to host form.
    pub fn to_external(&self, name: &str) -> String {
        self.dialect.identifier_to_external(name)
    }

    /// Host identifier to backend form.
    pub fn to_internal(&self, name: &str) -> String {
        self.dialect.identifier_to_internal(name)
    }

    pub fn reconstruct_type_name(&self, column: &CatalogColumn) -> String {
        self.dialect.reconstruct_type_name(column)
    }

    /// Keep the tables enumeration should report.
    pub fn filter_tables(&self, tables: Vec<TableEntry>) -> Vec<TableEntry> {
        let include = self.config.include_system_tables;
        tables
            .into_iter()
            .filter(|t| self.dialect.filter_system_tables(t, include))
            .collect()
    }

    // =========================================================================
    // Transactions
    // =========================================================================

    pub async fn create_savepoint(&mut self, conn: &mut dyn TransactionConnection, name: &str) -> Result<()> {
        self.savepoints.create(self.dialect.as_ref(), conn, name).await
    }

    pub async fn rollback_to_savepoint(
        &mut self,
        conn: &mut dyn TransactionConnection,
        name: &str,
    ) -> Result<()> {
        self.savepoints.rollback(self.dialect.as_ref(), conn, name).await
    }

    pub async fn release_savepoint(&mut self, conn: &mut dyn TransactionConnection, name: &str) -> Result<()> {
        self.savepoints.release(self.dialect.as_ref(), conn, name).await
    }

    /// Whether a savepoint named `name` is live.
    pub fn has_savepoint(&self, name: &str) -> bool {
        self.savepoints.contains(name)
    }

    /// Commit the transaction. The savepoint table is cleared either way.
    pub async fn commit(&mut self, conn: &mut dyn TransactionConnection) -> Result<()> {
        self.end_transaction(conn, "COMMIT", "commit").await
    }

    /// Roll back the transaction. The savepoint table is cleared either way.
    pub async fn rollback(&mut self, conn: &mut dyn TransactionConnection) -> Result<()> {
        self.end_transaction(conn, "ROLLBACK", "rollback").await
    }

    /// Forget savepoints without touching the connection.
    pub fn reset(&mut self) {
        self.savepoints.clear();
    }

    async fn end_transaction(
        &mut self,
        conn: &mut dyn TransactionConnection,
        sql: &str,
        operation: &str,
    ) -> Result<()> {
        let result = conn
            .execute(sql)
            .await
            .map_err(|e| BridgeError::retrieval(self.dialect.name(), operation, e));
        self.savepoints.clear();
        result
    }
}
