//! Savepoint state machine.
//!
//! Every connection owns one [`SavepointManager`]. It keeps a table from
//! savepoint name to handle and drives the connection through the dialect's
//! savepoint statements:
//!
//! ```text
//! absent --create--> created --release--> absent
//!                      |  ^
//!                rollback |
//!                      +--+
//! ```
//!
//! Native dialects go through the connection's savepoint API and keep the
//! returned token. Emulated dialects issue raw SQL and keep only the name.
//! The whole table is cleared at every outer transaction boundary.

use std::collections::HashMap;

use async_trait::async_trait;
use tracing::debug;

use crate::core::traits::Dialect;
use crate::error::{BridgeError, DriverFault, Result};

/// How a dialect implements savepoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SavepointStrategy {
    /// The driver's savepoint objects are used.
    Native,
    /// Savepoints are tracked by name and driven with raw SQL.
    Emulated,
}

/// Token returned by a driver's native savepoint API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeSavepoint {
    pub id: u64,
    pub name: String,
}

/// Entry of the savepoint table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SavepointHandle {
    Native(NativeSavepoint),
    /// Tracked only by name.
    Emulated,
}

/// Transaction-level operations of a live connection.
#[async_trait]
pub trait TransactionConnection: Send {
    /// Execute a statement that returns no rows.
    async fn execute(&mut self, sql: &str) -> std::result::Result<(), DriverFault>;

    async fn set_savepoint(&mut self, name: &str) -> std::result::Result<NativeSavepoint, DriverFault>;

    async fn rollback_to_savepoint(
        &mut self,
        savepoint: &NativeSavepoint,
    ) -> std::result::Result<(), DriverFault>;

    async fn release_savepoint(
        &mut self,
        savepoint: &NativeSavepoint,
    ) -> std::result::Result<(), DriverFault>;
}

/// Per-connection savepoint table.
#[derive(Debug, Default)]
pub struct SavepointManager {
    table: HashMap<String, SavepointHandle>,
}

impl SavepointManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `name` has a live entry.
    pub fn contains(&self, name: &str) -> bool {
        self.table.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Create a savepoint and register it. An existing entry with the same
    /// name is replaced.
    pub async fn create(
        &mut self,
        dialect: &dyn Dialect,
        conn: &mut dyn TransactionConnection,
        name: &str,
    ) -> Result<()> {
        validate_name(name)?;

        let handle = match dialect.savepoint_strategy() {
            SavepointStrategy::Native => {
                let token = conn
                    .set_savepoint(name)
                    .await
                    .map_err(|e| BridgeError::retrieval(dialect.name(), "create savepoint", e))?;
                SavepointHandle::Native(token)
            }
            SavepointStrategy::Emulated => {
                let sql = dialect.savepoint_sql(name);
                run_emulated(dialect, conn, &sql, "create savepoint").await?;
                SavepointHandle::Emulated
            }
        };

        debug!("Savepoint {} created ({})", name, dialect.name());
        self.table.insert(name.to_string(), handle);
        Ok(())
    }

    /// Roll back to a savepoint. The entry stays live.
    pub async fn rollback(
        &mut self,
        dialect: &dyn Dialect,
        conn: &mut dyn TransactionConnection,
        name: &str,
    ) -> Result<()> {
        let handle = self
            .table
            .get(name)
            .ok_or_else(|| BridgeError::SavepointNotSet(name.to_string()))?;

        match handle {
            SavepointHandle::Native(token) => conn
                .rollback_to_savepoint(token)
                .await
                .map_err(|e| BridgeError::retrieval(dialect.name(), "rollback to savepoint", e)),
            SavepointHandle::Emulated => {
                let sql = dialect.rollback_to_savepoint_sql(name);
                run_emulated(dialect, conn, &sql, "rollback to savepoint").await
            }
        }
    }

    /// Release a savepoint and drop its entry.
    pub async fn release(
        &mut self,
        dialect: &dyn Dialect,
        conn: &mut dyn TransactionConnection,
        name: &str,
    ) -> Result<()> {
        let handle = self
            .table
            .get(name)
            .ok_or_else(|| BridgeError::SavepointNotSet(name.to_string()))?;

        match handle {
            SavepointHandle::Native(token) => conn
                .release_savepoint(token)
                .await
                .map_err(|e| BridgeError::retrieval(dialect.name(), "release savepoint", e))?,
            SavepointHandle::Emulated => {
                if let Some(sql) = dialect.release_savepoint_sql(name) {
                    run_emulated(dialect, conn, &sql, "release savepoint").await?;
                }
            }
        }

        self.table.remove(name);
        Ok(())
    }

    /// Forget every entry. Called at commit, rollback and reset.
    pub fn clear(&mut self) {
        if !self.table.is_empty() {
            debug!("Clearing {} savepoint(s)", self.table.len());
        }
        self.table.clear();
    }
}

fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() || !name.chars().all(|c| c.is_alphanumeric() || c == '_' || c == '$') {
        return Err(BridgeError::InvalidSavepointName(name.to_string()));
    }
    Ok(())
}

/// Issue emulated savepoint SQL.
///
/// This is the only place a [`BridgeError::DriverQuirk`] is downgraded to
/// success.
async fn run_emulated(
    dialect: &dyn Dialect,
    conn: &mut dyn TransactionConnection,
    sql: &str,
    operation: &str,
) -> Result<()> {
    let outcome = conn.execute(sql).await.map_err(|fault| match dialect.known_driver_quirk(&fault) {
        Some(quirk) => BridgeError::DriverQuirk {
            dialect: dialect.name().to_string(),
            quirk,
            operation: operation.to_string(),
        },
        None => BridgeError::retrieval(dialect.name(), operation, fault),
    });

    match outcome {
        Err(BridgeError::DriverQuirk { quirk, .. }) => {
            debug!("Ignoring known {} driver quirk '{}' during {}", dialect.name(), quirk, operation);
            Ok(())
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct RecordingConnection {
        statements: Vec<String>,
        native_calls: Vec<String>,
        fail_with: Option<DriverFault>,
        next_id: u64,
    }

    impl RecordingConnection {
        fn failing(fault: DriverFault) -> Self {
            Self {
                fail_with: Some(fault),
                ..Default::default()
            }
        }

        fn check(&self) -> std::result::Result<(), DriverFault> {
            match &self.fail_with {
                Some(fault) => Err(fault.clone()),
                None => Ok(()),
            }
        }
    }

    #[async_trait]
    impl TransactionConnection for RecordingConnection {
        async fn execute(&mut self, sql: &str) -> std::result::Result<(), DriverFault> {
            self.statements.push(sql.to_string());
            self.check()
        }

        async fn set_savepoint(&mut self, name: &str) -> std::result::Result<NativeSavepoint, DriverFault> {
            self.check()?;
            self.next_id += 1;
            self.native_calls.push(format!("set {}", name));
            Ok(NativeSavepoint {
                id: self.next_id,
                name: name.to_string(),
            })
        }

        async fn rollback_to_savepoint(
            &mut self,
            savepoint: &NativeSavepoint,
        ) -> std::result::Result<(), DriverFault> {
            self.native_calls.push(format!("rollback {}", savepoint.id));
            self.check()
        }

        async fn release_savepoint(
            &mut self,
            savepoint: &NativeSavepoint,
        ) -> std::result::Result<(), DriverFault> {
            self.native_calls.push(format!("release {}", savepoint.id));
            self.check()
        }
    }

    struct NativeDialect;

    impl Dialect for NativeDialect {
        fn name(&self) -> &str {
            "native"
        }
    }

    struct EmulatedDialect;

    impl Dialect for EmulatedDialect {
        fn name(&self) -> &str {
            "emulated"
        }

        fn savepoint_strategy(&self) -> SavepointStrategy {
            SavepointStrategy::Emulated
        }

        fn known_driver_quirk(&self, fault: &DriverFault) -> Option<&'static str> {
            (fault.code == Some(99)).then_some("spurious-no-result")
        }
    }

    // =========================================================================
    // State transitions
    // =========================================================================

    #[tokio::test]
    async fn test_create_then_release_removes_entry() {
        let mut conn = RecordingConnection::default();
        let mut sp = SavepointManager::new();
        sp.create(&EmulatedDialect, &mut conn, "sp1").await.unwrap();
        assert!(sp.contains("sp1"));
        sp.release(&EmulatedDialect, &mut conn, "sp1").await.unwrap();
        assert!(!sp.contains("sp1"));
        assert_eq!(conn.statements, vec!["SAVEPOINT sp1", "RELEASE SAVEPOINT sp1"]);
    }

    #[tokio::test]
    async fn test_release_unknown_name_fails() {
        let mut conn = RecordingConnection::default();
        let mut sp = SavepointManager::new();
        let err = sp.release(&EmulatedDialect, &mut conn, "never").await.unwrap_err();
        assert!(matches!(err, BridgeError::SavepointNotSet(name) if name == "never"));
        assert!(conn.statements.is_empty());
    }

    #[tokio::test]
    async fn test_rollback_keeps_entry_and_fails_after_release() {
        let mut conn = RecordingConnection::default();
        let mut sp = SavepointManager::new();
        sp.create(&EmulatedDialect, &mut conn, "a").await.unwrap();
        sp.rollback(&EmulatedDialect, &mut conn, "a").await.unwrap();
        sp.rollback(&EmulatedDialect, &mut conn, "a").await.unwrap();
        assert!(sp.contains("a"));
        sp.release(&EmulatedDialect, &mut conn, "a").await.unwrap();
        let err = sp.rollback(&EmulatedDialect, &mut conn, "a").await.unwrap_err();
        assert!(matches!(err, BridgeError::SavepointNotSet(_)));
    }

    #[tokio::test]
    async fn test_clear_forgets_all_names() {
        let mut conn = RecordingConnection::default();
        let mut sp = SavepointManager::new();
        sp.create(&EmulatedDialect, &mut conn, "a").await.unwrap();
        sp.create(&EmulatedDialect, &mut conn, "b").await.unwrap();
        sp.clear();
        assert!(sp.is_empty());
        assert!(sp.release(&EmulatedDialect, &mut conn, "a").await.is_err());

        sp.create(&EmulatedDialect, &mut conn, "a").await.unwrap();
        sp.release(&EmulatedDialect, &mut conn, "a").await.unwrap();
    }

    #[tokio::test]
    async fn test_invalid_names_rejected() {
        let mut conn = RecordingConnection::default();
        let mut sp = SavepointManager::new();
        for name in ["", "a b", "x;DROP TABLE t"] {
            let err = sp.create(&EmulatedDialect, &mut conn, name).await.unwrap_err();
            assert!(matches!(err, BridgeError::InvalidSavepointName(_)));
        }
        assert!(conn.statements.is_empty());
    }

    // =========================================================================
    // Native handles
    // =========================================================================

    #[tokio::test]
    async fn test_native_uses_driver_tokens() {
        let mut conn = RecordingConnection::default();
        let mut sp = SavepointManager::new();
        sp.create(&NativeDialect, &mut conn, "n1").await.unwrap();
        sp.rollback(&NativeDialect, &mut conn, "n1").await.unwrap();
        sp.release(&NativeDialect, &mut conn, "n1").await.unwrap();
        assert_eq!(conn.native_calls, vec!["set n1", "rollback 1", "release 1"]);
        assert!(conn.statements.is_empty());
    }

    // =========================================================================
    // Faults
    // =========================================================================

    #[tokio::test]
    async fn test_known_quirk_downgraded() {
        let mut conn = RecordingConnection::failing(DriverFault::new("no result").with_code(99));
        let mut sp = SavepointManager::new();
        sp.create(&EmulatedDialect, &mut conn, "q").await.unwrap();
        assert!(sp.contains("q"));
    }

    #[tokio::test]
    async fn test_other_faults_propagate_tagged() {
        let mut conn = RecordingConnection::failing(DriverFault::new("disk full").with_code(1));
        let mut sp = SavepointManager::new();
        let err = sp.create(&EmulatedDialect, &mut conn, "q").await.unwrap_err();
        match err {
            BridgeError::Retrieval { dialect, operation, .. } => {
                assert_eq!(dialect, "emulated");
                assert_eq!(operation, "create savepoint");
            }
            other => panic!("unexpected error: {}", other),
        }
        assert!(!sp.contains("q"));
    }
}
