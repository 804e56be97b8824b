//! Error types for tscell.
//!
//! Defines the main error enum used throughout the interpreter.

use thiserror::Error;

/// Main error type for tscell operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CellError {
    /// The engine rejected a statement (syntax errors, unknown series, etc.).
    ///
    /// Displayed as `"{code}: {message}"` so the engine's diagnostic reaches
    /// the user unchanged.
    #[error("{code}: {message}")]
    Execution { code: u16, message: String },

    /// Configuration errors (invalid config file, bad CLI values, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O errors while reading scripts, seeds or config files.
    #[error("I/O error: {0}")]
    Io(String),

    /// Internal errors (poisoned locks, serialization failures, etc.)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CellError {
    /// Creates an execution error with the given engine status code.
    pub fn execution(code: u16, msg: impl Into<String>) -> Self {
        Self::Execution {
            code,
            message: msg.into(),
        }
    }

    /// Creates a configuration error with the given message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Creates an I/O error with the given message.
    pub fn io(msg: impl Into<String>) -> Self {
        Self::Io(msg.into())
    }

    /// Creates an internal error with the given message.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Returns the engine status code for execution errors.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Execution { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// Returns the error category as a string for display purposes.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Execution { .. } => "Execution Error",
            Self::Config(_) => "Configuration Error",
            Self::Io(_) => "I/O Error",
            Self::Internal(_) => "Internal Error",
        }
    }
}

/// Result type alias using CellError.
pub type Result<T> = std::result::Result<T, CellError>;
