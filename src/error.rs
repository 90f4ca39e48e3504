//! Error types for envaudit operations.
//!
//! This module defines [`AuditError`], the error type used throughout the
//! crate, and a [`Result`] type alias for convenience.
//!
//! # Error Handling Strategy
//!
//! - `Usage` covers malformed input: the run cannot continue
//! - `Evaluation` covers `eval:` expressions that fail to parse or evaluate
//! - Soft failures (missing extension, unset option) are never errors; they
//!   resolve predicates to `false`

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for envaudit operations.
#[derive(Debug, Error)]
pub enum AuditError {
    /// Requirements were supplied in a shape the checker cannot use.
    #[error("{message}")]
    Usage { message: String },

    /// A deferred condition expression failed to parse or evaluate.
    #[error("Failed to evaluate \"{expression}\": {message}")]
    Evaluation { expression: String, message: String },

    /// Failed to parse a requirements or environment file.
    #[error("Failed to parse {path}: {message}")]
    ConfigParse { path: PathBuf, message: String },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl AuditError {
    /// Shorthand for a usage error.
    pub fn usage(message: impl Into<String>) -> Self {
        AuditError::Usage {
            message: message.into(),
        }
    }

    /// Whether this error was caused by malformed input.
    pub fn is_usage(&self) -> bool {
        matches!(self, AuditError::Usage { .. })
    }
}

/// Result type alias for envaudit operations.
pub type Result<T> = std::result::Result<T, AuditError>;
