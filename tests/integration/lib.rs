//! Shared fixtures for the integration tests.

use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tenantvault_core::config::{Config, ConfigBuilder};
use tenantvault_secrets::EncryptionHelper;

/// SQLite URL for a database file inside `dir`.
pub fn sqlite_url(dir: &Path, name: &str) -> String {
    format!("sqlite://{}", dir.join(name).display())
}

/// A temp directory holding a config file with a fresh master key and a
/// database inside the same directory.
pub struct Fixture {
    pub dir: TempDir,
    pub config: Config,
    pub config_path: PathBuf,
}

impl Fixture {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("create temp dir");
        let config = ConfigBuilder::new()
            .master_key(EncryptionHelper::generate_key())
            .database_url(sqlite_url(dir.path(), "credentials.db"))
            .pool_size(2)
            .build();
        let config_path = dir.path().join("tenantvault.json5");
        config.save(&config_path).expect("save config");
        Self {
            dir,
            config,
            config_path,
        }
    }

    pub fn database_path(&self) -> PathBuf {
        self.dir.path().join("credentials.db")
    }
}

impl Default for Fixture {
    fn default() -> Self {
        Self::new()
    }
}
