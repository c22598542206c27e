use super::args::{Cli, Commands, LogLevel};
use super::handlers;
use crate::presentation::Palette;
use aide_runtime::Config;
use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

pub fn run(cli: Cli) -> Result<()> {
    init_logging(cli.log_level);

    let config = Config::load(cli.config.as_deref()).context("failed to load configuration")?;
    tracing::debug!(
        log_dir = %config.log_dir.display(),
        db_path = %config.db_path.display(),
        "configuration loaded"
    );
    let palette = Palette::detect();

    match cli.command {
        Commands::Ingest {
            full,
            verbose,
            json,
        } => handlers::ingest::handle(&config, full, verbose, json, &palette),
        Commands::Diagnose { session_id, json } => {
            handlers::diagnose::handle(&config, &session_id, json, &palette)
        }
    }
}

/// Logs go to stderr so stdout stays parseable.
fn init_logging(level: LogLevel) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.to_string()));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
