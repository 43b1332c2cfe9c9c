//! DailyFlow cache command line front end
//!
//! The binary wires a [`FileSyncStore`] (layers 1 and 2) and a
//! [`FileAsyncStore`] (layer 3) under the resolved cache directory into a
//! [`CacheManager`], then runs one subcommand.

pub mod cli;
pub mod commands;
pub mod config;
pub mod errors;
pub mod logging;
pub mod output;

use crate::cli::Cli;
use crate::config::Config;
use crate::errors::{CliError, Result};
use crate::logging::{LogFormat, LogLevel, LoggingOptions, parse_setting};
use dailyflow_cache::CacheManager;
use dailyflow_store::{FileAsyncStore, FileSyncStore, MemorySyncStore, SyncStore};
use std::path::Path;
use std::sync::Arc;

/// File backing the sync store inside the cache directory
pub const SYNC_STORE_FILE: &str = "local_storage.json";

/// Directory holding async store documents inside the cache directory
pub const ASYNC_STORE_DIR: &str = "raw";

/// Open the stores under `cache_dir` and build a manager over them.
///
/// A sync store file that cannot be read leaves the manager on an empty
/// in-memory sync store for this run, so commands such as `clear` still work.
#[must_use]
pub fn build_manager(config: &Config, cache_dir: &Path) -> CacheManager {
    let path = cache_dir.join(SYNC_STORE_FILE);
    let quota = Some(config.sync_quota());
    let sync_store: Arc<dyn SyncStore> = match FileSyncStore::open_with_quota(&path, quota) {
        Ok(store) => Arc::new(store),
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "Sync store unavailable, running without layers 1 and 2"
            );
            Arc::new(MemorySyncStore::with_quota(config.sync_quota()))
        }
    };
    let async_store = FileAsyncStore::new(cache_dir.join(ASYNC_STORE_DIR));
    CacheManager::new(sync_store, Arc::new(async_store), config.cache_config())
}

/// Pick logging options: command line flags win over the config file
///
/// # Errors
///
/// Returns error if the config file names an unknown level or format
pub fn logging_options(cli: &Cli, config: &Config) -> Result<LoggingOptions> {
    let from_file = |argument: &str, message: String| CliError::InvalidArgument {
        argument: argument.to_string(),
        message,
    };

    let format = if cli.json {
        LogFormat::Json
    } else if let Some(format) = cli.log_format {
        format
    } else if let Some(name) = &config.logging.format {
        parse_setting(name).map_err(|m| from_file("logging.format", m))?
    } else {
        LogFormat::default()
    };

    let level = match (cli.level, &config.logging.level) {
        (Some(level), _) => level,
        (None, Some(name)) => parse_setting(name).map_err(|m| from_file("logging.level", m))?,
        (None, None) => LogLevel::default(),
    };

    Ok(LoggingOptions { format, level })
}
