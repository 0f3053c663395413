//! Error types for typedkv
//!
//! Provides a unified error type for all operations.
//!
//! Absence ("key/field/member not present") is never an error: read
//! operations return `Option` or an empty collection instead.

use thiserror::Error;

/// Result type alias using KvError
pub type Result<T> = std::result::Result<T, KvError>;

/// Unified error type for typedkv operations
#[derive(Debug, Error)]
pub enum KvError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Connection Errors
    // -------------------------------------------------------------------------
    /// The raw session could not be established.
    #[error("Connection error: {0}")]
    Connection(String),

    /// A reply's shape did not match what the issuing command guarantees,
    /// or the wire framing was malformed.
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// The store answered with an error reply (e.g. `WRONGTYPE`).
    #[error("Server error: {0}")]
    Server(String),

    // -------------------------------------------------------------------------
    // Serialization Errors
    // -------------------------------------------------------------------------
    /// Wire content could not be converted into the target domain type.
    #[error("Format error: {0}")]
    Format(String),

    // -------------------------------------------------------------------------
    // Usage Errors
    // -------------------------------------------------------------------------
    /// A required collaborator was missing when building a template.
    #[error("Precondition failed: {0}")]
    Precondition(String),

    #[error("Index {index} out of bounds for buffer of length {length}")]
    OutOfBounds { index: usize, length: usize },

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<bincode::Error> for KvError {
    fn from(e: bincode::Error) -> Self {
        KvError::Format(e.to_string())
    }
}

impl KvError {
    /// Build a protocol error for a reply that `command` cannot produce.
    pub(crate) fn unexpected_reply(command: &str, got: &str) -> Self {
        KvError::Protocol(format!("{}: unexpected reply type {}", command, got))
    }
}
