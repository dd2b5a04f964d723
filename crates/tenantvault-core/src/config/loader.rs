//! Configuration loading and persistence.

use super::{Config, LogLevel};
use crate::env;
use crate::error::ConfigError;
use crate::paths;
use crate::secret::SecretString;
use std::fs;
use std::path::{Path, PathBuf};

/// Upper bound for `credentials.pool_size`.
pub const MAX_POOL_SIZE: u32 = 32;

impl Config {
    /// Resolve the config file path: `TENANTVAULT_CONFIG`, else the default.
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        match env::get_var(env::vars::TENANTVAULT_CONFIG) {
            Some(path) => Ok(paths::expand_tilde(&path)),
            None => paths::config_file(),
        }
    }

    /// Load configuration from the default path.
    pub fn load_default() -> Result<Self, ConfigError> {
        let path = Self::default_path()?;
        Self::load(&path)
    }

    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse configuration from a string.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        json5::from_str(content).map_err(|e| ConfigError::Syntax(e.to_string()))
    }

    /// Load the file at `path` (or the default path) with environment
    /// overrides applied. A missing file yields defaults plus environment.
    pub fn load_with_env(path: Option<&Path>) -> Result<Self, ConfigError> {
        let loaded = match path {
            Some(p) => Self::load(p),
            None => Self::load_default(),
        };
        let mut config = match loaded {
            Ok(config) => config,
            Err(ConfigError::NotFound(p)) => {
                tracing::debug!(path = %p.display(), "no config file, using defaults");
                Self::default()
            }
            Err(e) => return Err(e),
        };
        config.apply_env();
        Ok(config)
    }

    /// Overlay settings from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_env_with(env::get_var);
    }

    /// Overlay settings from `lookup`. Set values win over the file.
    pub fn apply_env_with<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup(env::vars::CREDENTIALS_MASTER_KEY) {
            self.credentials.master_key = Some(SecretString::new(key.trim()));
        }
    }

    /// Save configuration to a file path.
    ///
    /// The file may hold the master key, so it is written with mode 0600 on
    /// Unix.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = self.to_json5()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        // Write atomically
        let temp_path = path.with_extension("tmp");
        fs::write(&temp_path, &content)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&temp_path, fs::Permissions::from_mode(0o600))?;
        }

        fs::rename(&temp_path, path)?;
        Ok(())
    }

    /// Serialize to JSON5 string.
    pub fn to_json5(&self) -> Result<String, ConfigError> {
        // JSON is valid JSON5
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// JSON view of the configuration with the master key masked.
    pub fn to_redacted_json(&self) -> Result<serde_json::Value, ConfigError> {
        let mut value = serde_json::to_value(self)?;
        if let Some(key) = value
            .get_mut("credentials")
            .and_then(|c| c.get_mut("master_key"))
        {
            *key = serde_json::Value::String("[REDACTED]".to_string());
        }
        Ok(value)
    }

    /// Validate the configuration, collecting all errors before returning.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        let pool_size = self.credentials.pool_size;
        if pool_size == 0 || pool_size > MAX_POOL_SIZE {
            errors.push(format!(
                "credentials.pool_size must be 1-{MAX_POOL_SIZE}, got {pool_size}"
            ));
        }

        if let Some(url) = &self.credentials.database_url {
            if url.trim().is_empty() {
                errors.push("credentials.database_url must not be empty".to_string());
            } else if !url.starts_with("sqlite:") {
                errors.push("credentials.database_url must be a sqlite: URL".to_string());
            }
        }

        if let Some(key) = &self.credentials.master_key {
            if key.is_empty() {
                errors.push("credentials.master_key must not be empty".to_string());
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Invalid(errors))
        }
    }
}

/// Configuration builder for creating configs programmatically.
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Create a new config builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the master key (base64url-encoded).
    pub fn master_key(mut self, key: impl Into<SecretString>) -> Self {
        self.config.credentials.master_key = Some(key.into());
        self
    }

    /// Set the database URL.
    pub fn database_url(mut self, url: impl Into<String>) -> Self {
        self.config.credentials.database_url = Some(url.into());
        self
    }

    /// Set the connection pool size.
    pub fn pool_size(mut self, size: u32) -> Self {
        self.config.credentials.pool_size = size;
        self
    }

    /// Set the log level.
    pub fn log_level(mut self, level: LogLevel) -> Self {
        self.config.logging.level = level;
        self
    }

    /// Build the configuration.
    pub fn build(self) -> Config {
        self.config
    }

    /// Build and validate the configuration.
    pub fn build_validated(self) -> Result<Config, ConfigError> {
        self.config.validate()?;
        Ok(self.config)
    }
}
