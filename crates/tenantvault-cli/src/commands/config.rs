//! Configuration management commands.

use std::path::{Path, PathBuf};

use clap::Args;
use tenantvault_core::config::{Config, CREDENTIALS_SERVICE};
use tenantvault_core::error::ConfigError;
use tenantvault_secrets::EncryptionHelper;

use super::{load_config, redact_url};

/// Config command arguments.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(clap::Subcommand)]
pub enum ConfigCommand {
    /// Show effective configuration (master key redacted)
    Show,

    /// Initialize configuration
    Init {
        /// Force overwrite existing config
        #[arg(short, long)]
        force: bool,
    },

    /// Show configuration file path
    Path,

    /// Validate configuration
    Validate,
}

/// Run the config command.
pub async fn run(args: ConfigArgs, config_path: Option<&Path>) -> anyhow::Result<()> {
    match args.command {
        ConfigCommand::Show => {
            let config = load_config(config_path)?;
            println!("{}", serde_json::to_string_pretty(&effective_json(&config)?)?);
        }

        ConfigCommand::Init { force } => {
            let path = target_path(config_path)?;

            if path.exists() && !force {
                anyhow::bail!(
                    "Config file already exists: {:?}. Use --force to overwrite.",
                    path
                );
            }

            // Defaults only; the master key stays in the environment
            Config::default().save(&path)?;

            println!("Created config file: {:?}", path);
            println!("  Tip: Run 'tenantvault keygen' and export CREDENTIALS_MASTER_KEY.");
        }

        ConfigCommand::Path => {
            let path = target_path(config_path)?;
            println!("{}", path.display());
        }

        ConfigCommand::Validate => {
            let path = target_path(config_path)?;
            let mut config = match Config::load(&path) {
                Ok(config) => config,
                Err(e) => anyhow::bail!("Failed to load config: {}", e),
            };
            config.apply_env();
            check(&config)?;
            println!("Configuration is valid");
        }
    }

    Ok(())
}

/// Redacted config plus the database URL the store would actually open.
fn effective_json(config: &Config) -> anyhow::Result<serde_json::Value> {
    let mut json = config.to_redacted_json()?;
    let url = config.database_url(CREDENTIALS_SERVICE)?;
    json["credentials"]["database_url"] = serde_json::Value::String(redact_url(&url));
    Ok(json)
}

fn target_path(config_path: Option<&Path>) -> Result<PathBuf, ConfigError> {
    match config_path {
        Some(path) => Ok(path.to_path_buf()),
        None => Config::default_path(),
    }
}

/// Schema validation plus a decode of the master key when one is set.
fn check(config: &Config) -> anyhow::Result<()> {
    if let Err(e) = config.validate() {
        anyhow::bail!("Configuration error: {}", e);
    }
    if config.credentials.master_key.is_some() {
        EncryptionHelper::from_config(&config.credentials)
            .map_err(|e| anyhow::anyhow!("Configuration error: {}", e))?;
    }
    Ok(())
}
