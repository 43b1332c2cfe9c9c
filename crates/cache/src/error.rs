//! Error types for the cache crate
//!
//! Public [`CacheManager`](crate::CacheManager) operations never return these:
//! they are produced by the internal layer helpers and converted into cache
//! misses at the public boundary.

// Rust 1.92 compiler bug: false positives for thiserror/miette derive macro fields
// https://github.com/rust-lang/rust/issues/147648
#![allow(unused_assignments)]

use dailyflow_store::StoreError;
use miette::Diagnostic;
use thiserror::Error;

/// Error type for cache operations
#[derive(Error, Debug, Diagnostic)]
pub enum Error {
    /// The underlying key-value store failed
    #[error(transparent)]
    #[diagnostic(transparent)]
    Store(#[from] StoreError),

    /// A record was written by a different cache format version
    #[error("Cache record '{key}' has version {found}, expected {expected}")]
    #[diagnostic(
        code(dailyflow::cache::version_mismatch),
        help("The record is discarded; run a full sync to rebuild it")
    )]
    VersionMismatch {
        /// Key of the stale record
        key: String,
        /// Version stored in the record
        found: String,
        /// Version the manager is configured for
        expected: String,
    },

    /// Compressed payload could not be decoded
    #[error("Failed to decompress payload under '{key}'")]
    #[diagnostic(code(dailyflow::cache::decompression))]
    Decompression {
        /// Key holding the payload
        key: String,
    },

    /// Compression of a payload failed
    #[error("Compression error: {message}")]
    #[diagnostic(code(dailyflow::cache::compression))]
    Compression {
        /// Error message describing the compression issue
        message: String,
    },

    /// Record could not be encoded or decoded, or has the wrong shape
    #[error("Serialization error: {message}")]
    #[diagnostic(code(dailyflow::cache::serialization))]
    Serialization {
        /// Error message describing the serialization issue
        message: String,
    },

    /// Invalid cache configuration
    #[error("Cache configuration error: {message}")]
    #[diagnostic(code(dailyflow::cache::config))]
    Configuration {
        /// Error message describing the configuration issue
        message: String,
    },
}

impl Error {
    /// Create a serialization error
    #[must_use]
    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::Serialization {
            message: msg.into(),
        }
    }

    /// Create a compression error
    #[must_use]
    pub fn compression(msg: impl Into<String>) -> Self {
        Self::Compression {
            message: msg.into(),
        }
    }

    /// Create a configuration error
    #[must_use]
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration {
            message: msg.into(),
        }
    }

    /// Whether the stored record itself is bad (stale, malformed or
    /// undecodable), as opposed to the store failing to read it
    #[must_use]
    pub const fn is_bad_record(&self) -> bool {
        matches!(
            self,
            Self::VersionMismatch { .. } | Self::Decompression { .. } | Self::Serialization { .. }
        )
    }

    /// Create a version mismatch error
    #[must_use]
    pub fn version_mismatch(
        key: impl Into<String>,
        found: impl Into<String>,
        expected: impl Into<String>,
    ) -> Self {
        Self::VersionMismatch {
            key: key.into(),
            found: found.into(),
            expected: expected.into(),
        }
    }
}

/// Result type for cache operations
pub type Result<T> = std::result::Result<T, Error>;
