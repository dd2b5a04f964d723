//! TenantVault command-line interface.

pub mod commands;

use clap::{Parser, Subcommand};
use tenantvault_core::config::LogLevel;
use tenantvault_secrets::EncryptionHelper;

/// TenantVault - tenant-scoped encrypted credential store
#[derive(Parser)]
#[command(name = "tenantvault")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Increase logging verbosity
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to config file
    #[arg(short, long, env = "TENANTVAULT_CONFIG", global = true)]
    pub config: Option<std::path::PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Generate a new master key
    Keygen,

    /// Manage encrypted credentials
    Secrets(commands::secrets::SecretsArgs),

    /// Configuration management
    Config(commands::config::ConfigArgs),

    /// Run diagnostics
    Doctor,

    /// Show version information
    Version,
}

/// Filter directive for the `tenantvault*` targets.
///
/// `-v` selects debug, or trace when the config already asks for debug.
/// `-vv` always selects trace.
pub fn log_filter(verbose: u8, level: LogLevel) -> String {
    let level = match (verbose, level) {
        (0, level) => level,
        (1, LogLevel::Trace | LogLevel::Debug) | (2.., _) => LogLevel::Trace,
        (1, _) => LogLevel::Debug,
    };
    format!("tenantvault={}", level.as_str())
}

/// Run the CLI with the given arguments.
pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let config_path = cli.config.as_deref();
    match cli.command {
        Commands::Keygen => {
            println!("{}", EncryptionHelper::generate_key());
            eprintln!("Store this value as CREDENTIALS_MASTER_KEY. Losing it makes stored credentials unreadable.");
            Ok(())
        }
        Commands::Secrets(args) => commands::secrets::run(args, config_path).await,
        Commands::Config(args) => commands::config::run(args, config_path).await,
        Commands::Doctor => commands::doctor::run(config_path).await,
        Commands::Version => {
            println!("tenantvault {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}
