//! Dialect catalog for explicit dependency injection.
//!
//! The [`DialectCatalog`] maps dialect names and aliases to dialect
//! implementations and records which drivers have been loaded in this
//! process. It is constructed once, explicitly, and handed to every
//! [`Session`](crate::session::Session) that needs it.
//!
//! Lookup is read-only after construction. The loaded-driver flags are the
//! only mutable state and sit behind a mutex, so a catalog can be shared
//! across threads behind an `Arc`.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::info;

use crate::drivers::{DialectImpl, BUILTIN_DIALECTS};
use crate::error::{BridgeError, Result};

use super::traits::Dialect;

/// Registry of dialects.
///
/// # Example
///
/// ```rust
/// use dialect_bridge::core::catalog::DialectCatalog;
/// use dialect_bridge::core::traits::Dialect;
///
/// let catalog = DialectCatalog::with_builtins();
/// let dialect = catalog.require_dialect("sqlserver").unwrap();
/// assert_eq!(dialect.name(), "mssql");
/// ```
#[derive(Default)]
pub struct DialectCatalog {
    /// Registered dialects by canonical name.
    dialects: HashMap<String, Arc<dyn Dialect>>,

    /// Alias to canonical name.
    aliases: HashMap<String, String>,

    /// Canonical names of drivers loaded so far.
    loaded: Mutex<BTreeSet<String>>,
}

impl DialectCatalog {
    /// Create a new empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a catalog with every built-in dialect and alias registered.
    pub fn with_builtins() -> Self {
        let mut catalog = Self::new();
        for (name, aliases) in BUILTIN_DIALECTS {
            // Names come from the same table `from_db_type` resolves against.
            if let Ok(dialect) = DialectImpl::from_db_type(name) {
                catalog.register_dialect(*name, dialect);
                for alias in *aliases {
                    catalog.register_alias(*alias, *name);
                }
            }
        }
        catalog
    }

    /// Register a dialect by name.
    pub fn register_dialect(&mut self, name: impl Into<String>, dialect: impl Dialect + 'static) {
        self.dialects.insert(name.into().to_lowercase(), Arc::new(dialect));
    }

    /// Register a dialect as an Arc (for sharing).
    pub fn register_dialect_arc(&mut self, name: impl Into<String>, dialect: Arc<dyn Dialect>) {
        self.dialects.insert(name.into().to_lowercase(), dialect);
    }

    /// Register an alternative name for a registered dialect.
    pub fn register_alias(&mut self, alias: impl Into<String>, name: impl Into<String>) {
        self.aliases
            .insert(alias.into().to_lowercase(), name.into().to_lowercase());
    }

    /// Canonical name for a dialect name or alias.
    pub fn resolve_name(&self, name: &str) -> Option<&str> {
        let key = name.trim().to_lowercase();
        if let Some((canonical, _)) = self.dialects.get_key_value(&key) {
            return Some(canonical.as_str());
        }
        self.aliases
            .get(&key)
            .filter(|canonical| self.dialects.contains_key(canonical.as_str()))
            .map(String::as_str)
    }

    /// Get a dialect by name or alias.
    pub fn get_dialect(&self, name: &str) -> Option<Arc<dyn Dialect>> {
        self.resolve_name(name)
            .and_then(|canonical| self.dialects.get(canonical))
            .cloned()
    }

    /// Get a dialect by name, returning an error if not found.
    pub fn require_dialect(&self, name: &str) -> Result<Arc<dyn Dialect>> {
        self.get_dialect(name)
            .ok_or_else(|| BridgeError::UnknownDialect(name.to_string()))
    }

    /// Check if a dialect (or alias) is registered.
    pub fn has_dialect(&self, name: &str) -> bool {
        self.resolve_name(name).is_some()
    }

    /// All canonical dialect names, sorted.
    pub fn dialect_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.dialects.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Aliases registered for a canonical name, sorted.
    pub fn aliases_of(&self, name: &str) -> Vec<&str> {
        let mut aliases: Vec<&str> = self
            .aliases
            .iter()
            .filter(|(_, canonical)| canonical.as_str() == name)
            .map(|(alias, _)| alias.as_str())
            .collect();
        aliases.sort_unstable();
        aliases
    }

    // =========================================================================
    // Loaded-driver flags
    // =========================================================================

    /// Record that the driver for `name` is loaded.
    ///
    /// Returns `true` the first time a driver is marked.
    pub fn mark_loaded(&self, name: &str) -> Result<bool> {
        let canonical = self
            .resolve_name(name)
            .ok_or_else(|| BridgeError::UnknownDialect(name.to_string()))?
            .to_string();
        let first = self.loaded.lock().insert(canonical.clone());
        if first {
            info!("Loaded {} driver", canonical);
        }
        Ok(first)
    }

    /// Whether the driver for `name` has been loaded.
    pub fn is_loaded(&self, name: &str) -> bool {
        match self.resolve_name(name) {
            Some(canonical) => self.loaded.lock().contains(canonical),
            None => false,
        }
    }

    /// Names of the loaded drivers, sorted.
    pub fn loaded_names(&self) -> Vec<String> {
        self.loaded.lock().iter().cloned().collect()
    }

    /// Forget all loaded-driver flags.
    pub fn teardown(&self) {
        self.loaded.lock().clear();
    }
}

impl std::fmt::Debug for DialectCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DialectCatalog")
            .field("dialects", &self.dialect_names())
            .field("aliases", &self.aliases.len())
            .field("loaded", &self.loaded_names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct MockDialect {
        name: &'static str,
    }

    impl Dialect for MockDialect {
        fn name(&self) -> &str {
            self.name
        }
    }

    #[test]
    fn test_catalog_dialect_registration() {
        let mut catalog = DialectCatalog::new();
        assert!(!catalog.has_dialect("test"));

        catalog.register_dialect("test", MockDialect { name: "test" });
        assert!(catalog.has_dialect("TEST"));

        let dialect = catalog.get_dialect("test").unwrap();
        assert_eq!(dialect.name(), "test");
    }

    #[test]
    fn test_catalog_aliases() {
        let mut catalog = DialectCatalog::new();
        catalog.register_dialect("test", MockDialect { name: "test" });
        catalog.register_alias("t", "test");
        catalog.register_alias("dangling", "missing");

        assert_eq!(catalog.resolve_name("T"), Some("test"));
        assert!(catalog.get_dialect("t").is_some());
        assert!(!catalog.has_dialect("dangling"));
        assert_eq!(catalog.aliases_of("test"), vec!["t"]);
    }

    #[test]
    fn test_catalog_require() {
        let catalog = DialectCatalog::with_builtins();
        assert!(catalog.require_dialect("oracle").is_ok());
        assert!(matches!(
            catalog.require_dialect("nonexistent"),
            Err(BridgeError::UnknownDialect(_))
        ));
    }

    #[test]
    fn test_builtins() {
        let catalog = DialectCatalog::with_builtins();
        assert_eq!(catalog.dialect_names().len(), 12);
        assert_eq!(catalog.require_dialect("sqlite").unwrap().name(), "sqlite3");
        assert_eq!(catalog.require_dialect("pg").unwrap().name(), "postgres");
        assert!(catalog.aliases_of("mssql").contains(&"sqlserver"));
    }

    // =========================================================================
    // Loaded flags
    // =========================================================================

    #[test]
    fn test_mark_loaded_once() {
        let catalog = DialectCatalog::with_builtins();
        assert!(!catalog.is_loaded("oracle"));
        assert!(catalog.mark_loaded("oracle").unwrap());
        assert!(!catalog.mark_loaded("ORACLE").unwrap());
        assert!(catalog.is_loaded("oracle"));
        assert!(catalog.mark_loaded("sqlserver").unwrap());
        assert_eq!(catalog.loaded_names(), vec!["mssql", "oracle"]);
    }

    #[test]
    fn test_mark_loaded_unknown() {
        let catalog = DialectCatalog::with_builtins();
        assert!(catalog.mark_loaded("dbase").is_err());
    }

    #[test]
    fn test_teardown_clears_flags() {
        let catalog = DialectCatalog::with_builtins();
        catalog.mark_loaded("h2").unwrap();
        catalog.teardown();
        assert!(!catalog.is_loaded("h2"));
        assert!(catalog.mark_loaded("h2").unwrap());
    }
}
