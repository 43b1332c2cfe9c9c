//! `dailyflow` command line entry point

use dailyflow_cli::config::{CacheDirInputs, Config, resolve_cache_dir};
use dailyflow_cli::{build_manager, cli, commands, logging, logging_options};
use tracing::Instrument;

#[tokio::main]
async fn main() -> miette::Result<()> {
    let cli = cli::parse();

    let (config, config_path) = Config::load(cli.config.as_deref())?;
    let session = logging::init_logging(logging_options(&cli, &config)?)?;
    if let Some(path) = &config_path {
        tracing::debug!(path = %path.display(), "Loaded configuration");
    }

    let cache_dir = resolve_cache_dir(CacheDirInputs::from_env(cli.cache_dir.clone(), &config))?;
    tracing::debug!(cache_dir = %cache_dir.display(), "Using cache directory");

    let manager = build_manager(&config, &cache_dir);

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    commands::execute(cli.command, &manager, &mut out)
        .instrument(tracing::info_span!("session", id = %session))
        .await?;
    Ok(())
}
