//! Error types for smallkv
//!
//! Provides a unified error type for all operations.

use thiserror::Error;

/// Result type alias using SmallError
pub type Result<T> = std::result::Result<T, SmallError>;

/// Unified error type for smallkv operations
#[derive(Debug, Error)]
pub enum SmallError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Framing Errors (connection is dropped)
    // -------------------------------------------------------------------------
    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Unknown message type: {0}")]
    UnknownMessageType(u16),

    #[error("Connection closed by peer without a response")]
    ConnectionClosed,

    // -------------------------------------------------------------------------
    // Authentication Errors (connection is dropped)
    // -------------------------------------------------------------------------
    #[error("Secret key mismatch")]
    AuthenticationFailed,

    // -------------------------------------------------------------------------
    // Validation Errors (reported as status -1)
    // -------------------------------------------------------------------------
    #[error("{field} too long: {len} bytes (max {max})")]
    FieldTooLong {
        field: &'static str,
        len: usize,
        max: usize,
    },

    #[error("Invalid variable name: {0}")]
    InvalidName(String),

    #[error("Invalid run selector: {0:?}")]
    InvalidSelector(String),

    // -------------------------------------------------------------------------
    // Store / Subprocess Errors (reported as status -1)
    // -------------------------------------------------------------------------
    #[error("Variable not found: {0}")]
    NotFound(String),

    #[error("Subprocess error: {0}")]
    Subprocess(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl SmallError {
    /// Whether this error is answered with a normal `status = -1` response
    /// instead of dropping the connection.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            SmallError::FieldTooLong { .. }
                | SmallError::InvalidName(_)
                | SmallError::InvalidSelector(_)
                | SmallError::NotFound(_)
                | SmallError::Subprocess(_)
        )
    }
}
