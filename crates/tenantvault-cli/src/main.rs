//! TenantVault CLI entry point.

use std::path::Path;

use clap::Parser;
use tenantvault_cli::{log_filter, run, Cli};
use tenantvault_core::config::{Config, LoggingConfig};
use tenantvault_core::env;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Existing variables take precedence over .env
    let dotenv = env::load_dotenv(Path::new(".env"));

    let cli = Cli::parse();

    // Logging settings come from the config file; a broken file is reported
    // by the command itself.
    let logging = Config::load_with_env(cli.config.as_deref())
        .map(|c| c.logging)
        .unwrap_or_default();
    init_logging(cli.verbose, &logging);

    match dotenv {
        Ok(0) => {}
        Ok(n) => tracing::debug!(count = n, "loaded variables from .env"),
        Err(e) => tracing::warn!(error = %e, "failed to read .env"),
    }

    run(cli).await
}

fn init_logging(verbose: u8, logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_env(env::vars::TENANTVAULT_LOG)
        .unwrap_or_else(|_| log_filter(verbose, logging.level).into());

    // stdout carries command output, so logs go to stderr
    let json = logging.json.then(|| fmt::layer().json().with_writer(std::io::stderr));
    let text = (!logging.json).then(|| fmt::layer().with_writer(std::io::stderr));

    tracing_subscriber::registry()
        .with(filter)
        .with(json)
        .with(text)
        .init();
}
