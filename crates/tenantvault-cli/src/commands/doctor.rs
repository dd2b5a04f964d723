//! Diagnostic commands.

use std::fmt::Display;
use std::path::Path;

use console::{style, Emoji};
use tenantvault_core::config::{Config, CREDENTIALS_SERVICE};
use tenantvault_core::error::ConfigError;
use tenantvault_core::paths;
use tenantvault_secrets::{EncryptionHelper, SecretError};

use super::{open_store, redact_url};

static CHECK: Emoji = Emoji("✓", "+");
static CROSS: Emoji = Emoji("✗", "x");
static WARN: Emoji = Emoji("⚠", "!");

/// Tally of check outcomes, printed as it goes.
#[derive(Default)]
struct Report {
    failures: usize,
    warnings: usize,
}

impl Report {
    fn section(&self, title: &str) {
        println!("\n{}", style(title).bold());
    }

    fn pass(&self, msg: impl Display) {
        println!("  {} {}", style(CHECK).green(), msg);
    }

    fn warn(&mut self, msg: impl Display) {
        self.warnings += 1;
        println!("  {} {}", style(WARN).yellow(), msg);
    }

    fn fail(&mut self, msg: impl Display) {
        self.failures += 1;
        println!("  {} {}", style(CROSS).red(), msg);
    }

    fn hint(&self, msg: &str) {
        println!("    {msg}");
    }

    fn finish(self) -> anyhow::Result<()> {
        println!(
            "\n{} failure(s), {} warning(s)",
            style(self.failures).red(),
            style(self.warnings).yellow()
        );
        if self.failures > 0 {
            anyhow::bail!("doctor found {} failure(s)", self.failures);
        }
        Ok(())
    }
}

/// Check the base directory, config file, master key and database.
pub async fn run(config_path: Option<&Path>) -> anyhow::Result<()> {
    println!("TenantVault Doctor");
    let mut report = Report::default();

    report.section("Base directory");
    match paths::base_dir() {
        Ok(dir) if dir.exists() => report.pass(dir.display()),
        Ok(dir) => report.warn(format!("{} does not exist yet", dir.display())),
        Err(e) => report.fail(e),
    }

    report.section("Configuration");
    let loaded = match config_path {
        Some(path) => Config::load(path),
        None => Config::load_default(),
    };
    let mut config = match loaded {
        Ok(config) => {
            report.pass("config file parsed");
            config
        }
        Err(ConfigError::NotFound(path)) => {
            report.warn(format!("no config file at {}", path.display()));
            report.hint("run 'tenantvault config init' to create one");
            Config::default()
        }
        Err(e) => {
            report.fail(e);
            Config::default()
        }
    };
    config.apply_env();
    match config.validate() {
        Ok(()) => report.pass("settings valid"),
        Err(e) => report.fail(e),
    }

    report.section("Master key");
    let key_ok = match EncryptionHelper::from_config(&config.credentials) {
        Ok(_) => {
            report.pass("CREDENTIALS_MASTER_KEY decodes to a 256-bit key");
            true
        }
        Err(SecretError::MissingMasterKey) => {
            report.fail("CREDENTIALS_MASTER_KEY is not set");
            report.hint("run 'tenantvault keygen' to create one");
            false
        }
        Err(e) => {
            report.fail(e);
            false
        }
    };

    report.section("Credential database");
    match config.database_url(CREDENTIALS_SERVICE) {
        Ok(url) => report.pass(redact_url(&url)),
        Err(e) => report.fail(e),
    }
    if key_ok {
        match open_store(&config).await {
            Ok(service) => match service.health_check().await {
                Ok(()) => report.pass("reachable"),
                Err(e) => report.fail(format!("health check failed: {e}")),
            },
            Err(e) => report.fail(e),
        }
    } else {
        report.warn("connection not checked without a master key");
    }

    report.finish()
}
