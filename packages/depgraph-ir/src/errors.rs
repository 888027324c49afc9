//! Error types for depgraph-ir
//!
//! Contract violations detected by the analyzer facade. Recoverable analysis
//! problems (missing symbols, unsupported call sites) are never errors; they are
//! collected as diagnostics instead.

use crate::config::ConfigError;
use crate::shared::models::MethodReference;
use thiserror::Error;

/// Main error type for depgraph-ir operations
#[derive(Debug, Error)]
pub enum DepGraphError {
    /// New code or new symbols requested after completion began
    #[error("Can't {action} during completion phase")]
    CompletionPhase { action: String },

    /// Class not present in the class source
    #[error("Class not found: {0}")]
    ClassNotFound(String),

    /// Method submitted twice
    #[error("Method already exists: {0}")]
    MethodAlreadyExists(MethodReference),

    /// Body submitted for a method the analysis never reached
    #[error("Method was not reached: {0}")]
    MethodNotReached(MethodReference),

    /// Body submitted for a method that already has one
    #[error("Method is not native: {0}")]
    MethodNotNative(MethodReference),

    /// Entry point argument types do not match its signature
    #[error("Entry point {method} expects {expected} argument types, got {actual}")]
    EntryPointArity {
        method: MethodReference,
        expected: usize,
        actual: usize,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Class model (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl DepGraphError {
    /// Create a completion phase error
    pub fn completion_phase(action: impl Into<String>) -> Self {
        DepGraphError::CompletionPhase {
            action: action.into(),
        }
    }
}

/// Result type alias for depgraph operations
pub type Result<T> = std::result::Result<T, DepGraphError>;
