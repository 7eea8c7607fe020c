//! Error types for the dialect adaptation layer.

use thiserror::Error;

/// Fault reported by an external driver boundary (cursor, stream, connection).
///
/// Carries the driver's vendor code and SQLSTATE when it reported them, so that
/// dialects can recognise known driver defects by a stable identifier.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct DriverFault {
    /// Driver message text.
    pub message: String,
    /// Vendor-specific error code, if any.
    pub code: Option<i32>,
    /// Five-character SQLSTATE, if any.
    pub sql_state: Option<String>,
}

impl DriverFault {
    /// Create a fault with only a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: None,
            sql_state: None,
        }
    }

    /// Attach a vendor error code.
    pub fn with_code(mut self, code: i32) -> Self {
        self.code = Some(code);
        self
    }

    /// Attach a SQLSTATE.
    pub fn with_sql_state(mut self, sql_state: impl Into<String>) -> Self {
        self.sql_state = Some(sql_state.into());
        self
    }
}

impl From<std::io::Error> for DriverFault {
    fn from(err: std::io::Error) -> Self {
        DriverFault::new(format!("I/O error: {}", err))
    }
}

/// Main error type for decoding, quoting and savepoint operations.
#[derive(Error, Debug)]
pub enum BridgeError {
    /// The driver failed while a column value was being read.
    #[error("Retrieval failed for column {label} (#{index}, {kind}): {source}")]
    ColumnRetrieval {
        label: String,
        index: usize,
        kind: &'static str,
        #[source]
        source: DriverFault,
    },

    /// The driver failed inside a dialect hook or savepoint statement.
    #[error("{dialect} driver fault during {operation}: {source}")]
    Retrieval {
        dialect: String,
        operation: String,
        #[source]
        source: DriverFault,
    },

    /// Rollback or release referenced a savepoint with no live entry.
    #[error("Savepoint not set: {0}")]
    SavepointNotSet(String),

    /// Savepoint name is empty or unusable.
    #[error("Invalid savepoint name: {0:?}")]
    InvalidSavepointName(String),

    /// A known, named driver defect. Only the savepoint manager downgrades this.
    #[error("Known {dialect} driver quirk '{quirk}' during {operation}")]
    DriverQuirk {
        dialect: String,
        quirk: &'static str,
        operation: String,
    },

    /// No decoder and no opaque fallback exist for a column.
    #[error(
        "No decoder for column {label} (#{index}): type code {type_code}, precision {precision}, scale {scale}"
    )]
    UnsupportedShape {
        label: String,
        index: usize,
        type_code: i32,
        precision: i32,
        scale: i32,
    },

    /// Dialect name not registered in the catalog.
    #[error("Unknown dialect: '{0}'")]
    UnknownDialect(String),

    /// Configuration error (invalid YAML values, missing fields, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error (file operations)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML serialization/deserialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl BridgeError {
    /// Create a column retrieval error.
    pub fn column(
        label: impl Into<String>,
        index: usize,
        kind: &'static str,
        source: DriverFault,
    ) -> Self {
        BridgeError::ColumnRetrieval {
            label: label.into(),
            index,
            kind,
            source,
        }
    }

    /// Create a dialect-tagged retrieval error.
    pub fn retrieval(
        dialect: impl Into<String>,
        operation: impl Into<String>,
        source: DriverFault,
    ) -> Self {
        BridgeError::Retrieval {
            dialect: dialect.into(),
            operation: operation.into(),
            source,
        }
    }

    /// Process exit code for the CLI.
    pub fn exit_code(&self) -> u8 {
        match self {
            BridgeError::Config(_)
            | BridgeError::UnknownDialect(_)
            | BridgeError::Yaml(_)
            | BridgeError::Json(_) => 1,
            BridgeError::SavepointNotSet(_)
            | BridgeError::InvalidSavepointName(_)
            | BridgeError::DriverQuirk { .. } => 3,
            BridgeError::ColumnRetrieval { .. }
            | BridgeError::Retrieval { .. }
            | BridgeError::UnsupportedShape { .. } => 4,
            BridgeError::Io(_) => 7,
        }
    }

    /// Format error with full details including error chain
    pub fn format_detailed(&self) -> String {
        let mut output = format!("Error: {}\n", self);

        let mut source = std::error::Error::source(self);
        let mut depth = 1;
        while let Some(err) = source {
            output.push_str(&format!("\nCaused by:\n  {}: {}", depth, err));
            source = err.source();
            depth += 1;
        }

        output
    }
}

/// Result type alias for bridge operations.
pub type Result<T> = std::result::Result<T, BridgeError>;
