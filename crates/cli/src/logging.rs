//! Logging setup for the `dailyflow` binary
//!
//! Events go to stderr; stdout carries command output only.

use clap::ValueEnum;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};
use uuid::Uuid;

/// Crates whose events pass the default filter
const LOGGED_CRATES: [&str; 4] = [
    "dailyflow",
    "dailyflow_cli",
    "dailyflow_cache",
    "dailyflow_store",
];

/// How log lines are rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogFormat {
    /// Multi-line, human-readable
    Pretty,
    /// One line per event
    #[default]
    Compact,
    /// One JSON object per event, with span context
    Json,
    /// One line per event with source file and line
    Dev,
}

/// Minimum severity logged
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogLevel {
    /// Everything
    Trace,
    /// Cache hits, misses and store activity
    Debug,
    /// Sync summaries and clears
    Info,
    /// Self-healed records and failed saves
    #[default]
    #[value(alias = "warning")]
    Warn,
    /// Errors only
    Error,
}

impl LogLevel {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }

    /// `EnvFilter` directive enabling this level for the workspace crates
    fn directive(self) -> String {
        LOGGED_CRATES
            .iter()
            .map(|krate| format!("{krate}={}", self.as_str()))
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// Parse a `[logging]` value from the config file, ignoring case
///
/// # Errors
///
/// Returns the accepted values when `value` matches none of them
pub fn parse_setting<T: ValueEnum>(value: &str) -> Result<T, String> {
    T::from_str(value, true)
}

/// Resolved logging settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LoggingOptions {
    /// Output format
    pub format: LogFormat,
    /// Level used when `RUST_LOG` is unset
    pub level: LogLevel,
}

/// Install the global subscriber and return the id of this session
///
/// # Errors
///
/// Returns error if `RUST_LOG` cannot be parsed or a subscriber is already
/// installed
pub fn init_logging(options: LoggingOptions) -> miette::Result<Uuid> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(options.level.directive()))
        .map_err(|e| miette::miette!("Invalid log filter: {e}"))?;

    let output = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);
    let layer: Box<dyn Layer<Registry> + Send + Sync> = match options.format {
        LogFormat::Pretty => output.pretty().boxed(),
        LogFormat::Compact => output.compact().with_target(false).boxed(),
        LogFormat::Json => output
            .json()
            .with_current_span(true)
            .with_span_list(true)
            .boxed(),
        LogFormat::Dev => output.with_file(true).with_line_number(true).boxed(),
    };

    tracing_subscriber::registry()
        .with(layer)
        .with(filter)
        .try_init()
        .map_err(|e| miette::miette!("Failed to install log subscriber: {e}"))?;

    let session = Uuid::new_v4();
    tracing::debug!(
        %session,
        version = env!("CARGO_PKG_VERSION"),
        ?options,
        "Logging initialised"
    );
    Ok(session)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_parse_case_insensitively() {
        assert_eq!(parse_setting::<LogFormat>("JSON"), Ok(LogFormat::Json));
        assert_eq!(parse_setting::<LogLevel>("Info"), Ok(LogLevel::Info));
        assert_eq!(parse_setting::<LogLevel>("warning"), Ok(LogLevel::Warn));
        assert!(parse_setting::<LogLevel>("loud").is_err());
        assert!(parse_setting::<LogFormat>("xml").is_err());
    }

    #[test]
    fn test_directive_names_every_crate() {
        let directive = LogLevel::Info.directive();
        assert_eq!(
            directive,
            "dailyflow=info,dailyflow_cli=info,dailyflow_cache=info,dailyflow_store=info"
        );
        assert!(EnvFilter::try_new(directive).is_ok());
    }

    #[test]
    fn test_quiet_by_default() {
        let options = LoggingOptions::default();
        assert_eq!(options.level, LogLevel::Warn);
        assert_eq!(options.format, LogFormat::Compact);
    }
}
