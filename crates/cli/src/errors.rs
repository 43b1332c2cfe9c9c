//! CLI error types with miette diagnostics

// Rust 1.92 compiler bug: false positives for thiserror/miette derive macro fields
// https://github.com/rust-lang/rust/issues/147648
#![allow(unused_assignments)]

use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

/// CLI-specific error types
#[derive(Error, Debug, Diagnostic)]
pub enum CliError {
    /// Configuration file could not be parsed
    #[error("Failed to parse configuration file {}", path.display())]
    #[diagnostic(
        code(dailyflow::cli::config_parse),
        help("Check the [cache] and [logging] sections of the file")
    )]
    ConfigParse {
        /// Config file path
        path: PathBuf,
        /// Parser error
        #[source]
        source: toml::de::Error,
    },

    /// File operation failed
    #[error("Failed to {operation} {}", path.display())]
    #[diagnostic(
        code(dailyflow::cli::file_error),
        help("Check file permissions and ensure the path exists")
    )]
    File {
        /// Operation that failed
        operation: String,
        /// Path involved
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Task export could not be understood
    #[error("Invalid task export {}: {message}", path.display())]
    #[diagnostic(
        code(dailyflow::cli::invalid_input),
        help("Expected a JSON array of ClickUp tasks or an object with a `tasks` array")
    )]
    InvalidInput {
        /// Input file
        path: PathBuf,
        /// What was wrong
        message: String,
    },

    /// No writable cache directory could be found
    #[error("No writable cache directory found")]
    #[diagnostic(
        code(dailyflow::cli::cache_dir),
        help("Pass --cache-dir or set DAILYFLOW_CACHE_DIR")
    )]
    NoCacheDir,

    /// The requested layer holds no usable data
    #[error("No cached {layer} data")]
    #[diagnostic(
        code(dailyflow::cli::not_cached),
        help("Run `dailyflow sync --input <file>` to populate the cache")
    )]
    NotCached {
        /// Layer name
        layer: String,
    },

    /// Invalid argument value
    #[error("Invalid value for {argument}: {message}")]
    #[diagnostic(code(dailyflow::cli::invalid_argument))]
    InvalidArgument {
        /// Argument name
        argument: String,
        /// What was wrong
        message: String,
    },

    /// Cache error
    #[error(transparent)]
    #[diagnostic(transparent)]
    Cache(#[from] dailyflow_cache::Error),

    /// Command output could not be written
    #[error("Failed to write output")]
    #[diagnostic(code(dailyflow::cli::output))]
    Output {
        /// Underlying error
        #[source]
        source: std::io::Error,
    },
}

impl CliError {
    /// Create a file error
    #[must_use]
    pub fn file(
        operation: impl Into<String>,
        path: impl Into<PathBuf>,
        source: std::io::Error,
    ) -> Self {
        Self::File {
            operation: operation.into(),
            path: path.into(),
            source,
        }
    }

    /// Create an invalid input error
    #[must_use]
    pub fn invalid_input(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::InvalidInput {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a not-cached error
    #[must_use]
    pub fn not_cached(layer: impl Into<String>) -> Self {
        Self::NotCached {
            layer: layer.into(),
        }
    }
}

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;
