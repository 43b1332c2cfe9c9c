//! Error types for the store crate

// Rust 1.92 compiler bug: false positives for thiserror/miette derive macro fields
// https://github.com/rust-lang/rust/issues/147648
#![allow(unused_assignments)]

use miette::Diagnostic;
use std::path::Path;
use thiserror::Error;

/// Error type for key-value store operations
#[derive(Error, Debug, Diagnostic)]
pub enum StoreError {
    /// A synchronous write would exceed the store's capacity
    #[error("Storage quota exceeded writing '{key}': {requested} bytes requested, {quota} bytes allowed")]
    #[diagnostic(
        code(dailyflow::store::quota_exceeded),
        help("Clear a cache layer or raise the sync store quota")
    )]
    QuotaExceeded {
        /// Key being written
        key: String,
        /// Total estimated bytes the store would hold after the write
        requested: usize,
        /// Configured capacity in bytes
        quota: usize,
    },

    /// The backing substrate could not be opened or is in a broken state
    #[error("Storage unavailable: {message}")]
    #[diagnostic(code(dailyflow::store::unavailable))]
    Unavailable {
        /// What went wrong
        message: String,
    },

    /// I/O error from a file-backed substrate
    #[error("I/O {operation} failed{}", path.as_ref().map_or(String::new(), |p| format!(": {}", p.display())))]
    #[diagnostic(
        code(dailyflow::store::io),
        help("Check file permissions and ensure the cache directory exists")
    )]
    Io {
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
        /// Path that caused the error, if available
        path: Option<Box<Path>>,
        /// Operation that failed (e.g., "read", "write", "rename")
        operation: String,
    },

    /// A stored document could not be encoded or decoded
    #[error("Serialization error: {message}")]
    #[diagnostic(code(dailyflow::store::serialization))]
    Serialization {
        /// Error message describing the serialization issue
        message: String,
    },
}

impl StoreError {
    /// Create an unavailable-substrate error
    #[must_use]
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable {
            message: msg.into(),
        }
    }

    /// Create an I/O error with path context
    #[must_use]
    pub fn io(
        source: std::io::Error,
        path: impl AsRef<Path>,
        operation: impl Into<String>,
    ) -> Self {
        Self::Io {
            source,
            path: Some(path.as_ref().into()),
            operation: operation.into(),
        }
    }

    /// Create a serialization error
    #[must_use]
    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::Serialization {
            message: msg.into(),
        }
    }

    /// Whether this error is a capacity failure rather than a broken substrate
    #[must_use]
    pub fn is_quota_exceeded(&self) -> bool {
        matches!(self, Self::QuotaExceeded { .. })
    }
}

/// Result type for store operations
pub type Result<T> = std::result::Result<T, StoreError>;
