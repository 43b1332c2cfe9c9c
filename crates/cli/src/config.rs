//! Configuration file and cache directory resolution
//!
//! ```toml
//! [cache]
//! version = "3.0.0"
//! dir = "/var/cache/dailyflow"
//! syncQuotaBytes = 5242880
//! compressionLevel = 3
//!
//! [logging]
//! level = "info"
//! format = "json"
//! ```

use crate::errors::{CliError, Result};
use dailyflow_cache::CacheConfig;
use dailyflow_store::DEFAULT_SYNC_QUOTA_BYTES;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Config file name looked up in the working directory
pub const CONFIG_FILE_NAME: &str = "dailyflow.toml";

/// Top-level configuration file
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    /// Cache settings
    pub cache: CacheSection,
    /// Logging settings
    pub logging: LoggingSection,
}

/// `[cache]` section
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct CacheSection {
    /// Cache format version override
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Cache directory
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,
    /// Sync store capacity in UTF-16 bytes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sync_quota_bytes: Option<usize>,
    /// zstd level for processed data
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compression_level: Option<i32>,
}

/// `[logging]` section
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct LoggingSection {
    /// Log level name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
    /// Log format name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

impl Config {
    /// Parse configuration text; `path` is used for error reporting
    ///
    /// # Errors
    ///
    /// Returns error if the text is not valid TOML for this schema
    pub fn parse(text: &str, path: &Path) -> Result<Self> {
        toml::from_str(text).map_err(|source| CliError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load configuration.
    ///
    /// An explicit path must exist. Otherwise `DAILYFLOW_CONFIG`,
    /// `./dailyflow.toml` and `<config dir>/dailyflow/config.toml` are tried in
    /// order, and defaults are used when none exists.
    ///
    /// # Errors
    ///
    /// Returns error if a chosen file cannot be read or parsed
    pub fn load(explicit: Option<&Path>) -> Result<(Self, Option<PathBuf>)> {
        let path = match explicit {
            Some(path) => Some(path.to_path_buf()),
            None => config_candidates().into_iter().find(|p| p.is_file()),
        };
        let Some(path) = path else {
            return Ok((Self::default(), None));
        };
        let text = fs::read_to_string(&path).map_err(|e| CliError::file("read", &path, e))?;
        let config = Self::parse(&text, &path)?;
        Ok((config, Some(path)))
    }

    /// Cache manager configuration derived from the `[cache]` section
    #[must_use]
    pub fn cache_config(&self) -> CacheConfig {
        let mut config = CacheConfig::default();
        if let Some(version) = &self.cache.version {
            config.version.clone_from(version);
        }
        if let Some(level) = self.cache.compression_level {
            config.compression_level = level;
        }
        config
    }

    /// Sync store quota in bytes
    #[must_use]
    pub fn sync_quota(&self) -> usize {
        self.cache.sync_quota_bytes.unwrap_or(DEFAULT_SYNC_QUOTA_BYTES)
    }
}

fn config_candidates() -> Vec<PathBuf> {
    let mut candidates = Vec::new();
    if let Some(env) = std::env::var_os("DAILYFLOW_CONFIG").filter(|v| !v.is_empty()) {
        candidates.push(PathBuf::from(env));
    }
    candidates.push(PathBuf::from(CONFIG_FILE_NAME));
    if let Some(dir) = dirs::config_dir() {
        candidates.push(dir.join("dailyflow/config.toml"));
    }
    candidates
}

/// Inputs for determining the cache directory
#[derive(Debug, Clone, Default)]
pub struct CacheDirInputs {
    /// `--cache-dir`
    pub cli_dir: Option<PathBuf>,
    /// `DAILYFLOW_CACHE_DIR`
    pub env_dir: Option<PathBuf>,
    /// `[cache] dir`
    pub config_dir: Option<PathBuf>,
    /// `XDG_CACHE_HOME`
    pub xdg_cache_home: Option<PathBuf>,
    /// Platform cache directory
    pub os_cache_dir: Option<PathBuf>,
    /// Home directory
    pub home_dir: Option<PathBuf>,
    /// Temporary directory
    pub temp_dir: PathBuf,
}

impl CacheDirInputs {
    /// Gather inputs from the environment
    #[must_use]
    pub fn from_env(cli_dir: Option<PathBuf>, config: &Config) -> Self {
        let non_empty = |name: &str| {
            std::env::var(name)
                .ok()
                .filter(|s| !s.trim().is_empty())
                .map(PathBuf::from)
        };
        Self {
            cli_dir,
            env_dir: non_empty("DAILYFLOW_CACHE_DIR"),
            config_dir: config.cache.dir.clone(),
            xdg_cache_home: non_empty("XDG_CACHE_HOME"),
            os_cache_dir: dirs::cache_dir(),
            home_dir: dirs::home_dir(),
            temp_dir: std::env::temp_dir(),
        }
    }
}

/// Pick the first usable cache directory.
///
/// Resolution order (first writable wins):
/// 1) `--cache-dir`
/// 2) `DAILYFLOW_CACHE_DIR`
/// 3) `[cache] dir` from the config file
/// 4) `XDG_CACHE_HOME/dailyflow`
/// 5) OS cache dir/dailyflow
/// 6) `~/.dailyflow/cache`
/// 7) `TMPDIR/dailyflow/cache`
///
/// # Errors
///
/// Returns error if no candidate can be created or written
pub fn resolve_cache_dir(inputs: CacheDirInputs) -> Result<PathBuf> {
    let mut candidates: Vec<PathBuf> = Vec::new();
    candidates.extend(inputs.cli_dir.filter(|p| !p.as_os_str().is_empty()));
    candidates.extend(inputs.env_dir);
    candidates.extend(inputs.config_dir);
    if let Some(xdg) = inputs.xdg_cache_home {
        candidates.push(xdg.join("dailyflow"));
    }
    if let Some(os_cache) = inputs.os_cache_dir {
        candidates.push(os_cache.join("dailyflow"));
    }
    if let Some(home) = inputs.home_dir {
        candidates.push(home.join(".dailyflow/cache"));
    }
    candidates.push(inputs.temp_dir.join("dailyflow/cache"));

    for path in candidates {
        if path.exists() {
            // Existing directories may be read-only (CI caches, shared homes)
            let probe = path.join(".write_probe");
            match fs::OpenOptions::new()
                .create(true)
                .truncate(true)
                .write(true)
                .open(&probe)
            {
                Ok(_) => {
                    let _ = fs::remove_file(&probe);
                    return Ok(path);
                }
                Err(e) => {
                    tracing::debug!(path = %path.display(), error = %e, "Cache dir not writable");
                    continue;
                }
            }
        }
        if fs::create_dir_all(&path).is_ok() {
            return Ok(path);
        }
    }
    Err(CliError::NoCacheDir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_full_config() {
        let text = r#"
            [cache]
            version = "4.0.0"
            dir = "/srv/dailyflow"
            syncQuotaBytes = 1024
            compressionLevel = 9

            [logging]
            level = "debug"
            format = "json"
        "#;
        let config = Config::parse(text, Path::new("dailyflow.toml")).unwrap();
        assert_eq!(config.cache.dir, Some(PathBuf::from("/srv/dailyflow")));
        assert_eq!(config.sync_quota(), 1024);
        assert_eq!(config.logging.format.as_deref(), Some("json"));

        let cache = config.cache_config();
        assert_eq!(cache.version, "4.0.0");
        assert_eq!(cache.compression_level, 9);
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = Config::parse("", Path::new("dailyflow.toml")).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.sync_quota(), DEFAULT_SYNC_QUOTA_BYTES);
        assert_eq!(config.cache_config(), CacheConfig::default());
    }

    #[test]
    fn test_parse_error_names_file() {
        let err = Config::parse("[cache]\nsyncQuotaBytes = \"lots\"", Path::new("bad.toml"))
            .unwrap_err();
        assert!(err.to_string().contains("bad.toml"));
    }

    #[test]
    fn test_load_explicit_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("custom.toml");
        fs::write(&path, "[logging]\nlevel = \"info\"\n").unwrap();

        let (config, used) = Config::load(Some(&path)).unwrap();
        assert_eq!(used, Some(path));
        assert_eq!(config.logging.level.as_deref(), Some("info"));
    }

    #[test]
    fn test_load_missing_explicit_file_fails() {
        let tmp = TempDir::new().unwrap();
        let err = Config::load(Some(&tmp.path().join("nope.toml"))).unwrap_err();
        assert!(matches!(err, CliError::File { .. }));
    }

    #[test]
    fn test_cli_dir_wins() {
        let tmp = TempDir::new().unwrap();
        let cli = tmp.path().join("cli");
        let inputs = CacheDirInputs {
            cli_dir: Some(cli.clone()),
            env_dir: Some(tmp.path().join("env")),
            temp_dir: tmp.path().to_path_buf(),
            ..Default::default()
        };
        assert_eq!(resolve_cache_dir(inputs).unwrap(), cli);
        assert!(cli.is_dir());
    }

    #[test]
    fn test_falls_back_to_temp_dir() {
        let tmp = TempDir::new().unwrap();
        let inputs = CacheDirInputs {
            temp_dir: tmp.path().to_path_buf(),
            ..Default::default()
        };
        assert_eq!(
            resolve_cache_dir(inputs).unwrap(),
            tmp.path().join("dailyflow/cache")
        );
    }

    #[test]
    fn test_xdg_before_home() {
        let tmp = TempDir::new().unwrap();
        let inputs = CacheDirInputs {
            xdg_cache_home: Some(tmp.path().join("xdg")),
            home_dir: Some(tmp.path().join("home")),
            temp_dir: tmp.path().to_path_buf(),
            ..Default::default()
        };
        assert_eq!(
            resolve_cache_dir(inputs).unwrap(),
            tmp.path().join("xdg/dailyflow")
        );
    }

    #[test]
    fn test_env_dir_from_environment() {
        let tmp = TempDir::new().unwrap();
        let env_dir = tmp.path().join("from-env");
        temp_env::with_var("DAILYFLOW_CACHE_DIR", Some(&env_dir), || {
            let inputs = CacheDirInputs::from_env(None, &Config::default());
            assert_eq!(inputs.env_dir.as_deref(), Some(env_dir.as_path()));
        });
    }
}
