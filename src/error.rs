//! Error types for amiwire
//!
//! Provides a unified error type for all operations.
//!
//! There is deliberately no decode error: reply lines that do not look like
//! `Key: Value` are skipped by the parser rather than reported.

use thiserror::Error;

/// Result type alias using AmiError
pub type Result<T> = std::result::Result<T, AmiError>;

/// Unified error type for amiwire operations
#[derive(Debug, Error)]
pub enum AmiError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Session Errors
    // -------------------------------------------------------------------------
    /// The TCP connection could not be opened (unreachable, refused, timed out)
    #[error("Connect error: {addr}: {source}")]
    Connect {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// The connection opened but the login was rejected or malformed
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// No open session, or an invalid command handed to an exchange
    #[error("Transport error: {0}")]
    Transport(String),

    // -------------------------------------------------------------------------
    // Action Errors
    // -------------------------------------------------------------------------
    #[error("Action {action} failed: {message}")]
    ActionFailed { action: String, message: String },

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl AmiError {
    /// OS-level error code behind a connect or I/O failure, if any
    pub fn os_error(&self) -> Option<i32> {
        match self {
            AmiError::Connect { source, .. } => source.raw_os_error(),
            AmiError::Io(e) => e.raw_os_error(),
            _ => None,
        }
    }

    pub(crate) fn transport(message: impl Into<String>) -> Self {
        AmiError::Transport(message.into())
    }
}
