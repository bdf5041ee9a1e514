//! Error types for Metrix
//!
//! This module defines the common error types used throughout the system.

use crate::types::NameError;
use thiserror::Error;

/// Common result type for Metrix operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error type for Metrix
#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to open index store: {0}")]
    Open(String),

    #[error("index not found: {0}")]
    NotFound(String),

    #[error("codec error for index '{name}': {reason}")]
    Codec { name: String, reason: String },

    #[error("store I/O error: {0}")]
    StoreIo(String),

    #[error("index store is closed")]
    Closed,

    #[error("invalid metric name: {0}")]
    InvalidName(#[from] NameError),

    #[error("configuration error: {0}")]
    Configuration(String),
}

impl Error {
    /// Create a not found error
    pub fn not_found(name: impl Into<String>) -> Self {
        Self::NotFound(name.into())
    }

    /// Create a codec error
    pub fn codec(name: impl Into<String>, reason: impl ToString) -> Self {
        Self::Codec {
            name: name.into(),
            reason: reason.to_string(),
        }
    }

    /// Create a store I/O error
    pub fn store_io(msg: impl Into<String>) -> Self {
        Self::StoreIo(msg.into())
    }

    /// Check if this is a not found error
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Check if the handle was already closed
    #[must_use]
    pub fn is_closed(&self) -> bool {
        matches!(self, Self::Closed)
    }
}
