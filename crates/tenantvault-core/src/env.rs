//! Environment variable handling.

use std::env;
use std::path::Path;

/// Get an environment variable, returning None if not set or empty.
pub fn get_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.is_empty())
}

/// Load `KEY=value` pairs from a dotenv file.
///
/// Variables that are already set are left alone. A missing file is not an
/// error. Returns the number of variables set.
pub fn load_dotenv(path: &Path) -> Result<usize, std::io::Error> {
    if !path.exists() {
        return Ok(0);
    }

    let content = std::fs::read_to_string(path)?;
    let mut loaded = 0;
    for (key, value) in parse_dotenv(&content) {
        if env::var(key).is_err() {
            env::set_var(key, value);
            loaded += 1;
        }
    }
    Ok(loaded)
}

/// Parse dotenv content into key/value pairs.
///
/// Skips blank lines and `#` comments, accepts an optional `export ` prefix,
/// strips one layer of matching single or double quotes.
pub fn parse_dotenv(content: &str) -> Vec<(&str, &str)> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| {
            let line = line.strip_prefix("export ").unwrap_or(line);
            let (key, value) = line.split_once('=')?;
            let key = key.trim();
            if key.is_empty() {
                return None;
            }
            let value = value.trim();
            let value = value
                .strip_prefix('"')
                .and_then(|v| v.strip_suffix('"'))
                .or_else(|| value.strip_prefix('\'').and_then(|v| v.strip_suffix('\'')))
                .unwrap_or(value);
            Some((key, value))
        })
        .collect()
}

/// Environment variable names.
pub mod vars {
    /// Base64url-encoded master key for credential encryption.
    pub const CREDENTIALS_MASTER_KEY: &str = "CREDENTIALS_MASTER_KEY";

    /// Shared database URL; the last path segment is replaced per service.
    pub const DATABASE_URL: &str = "DATABASE_URL";

    /// Database name substituted into [`DATABASE_URL`].
    pub const DATABASE_NAME: &str = "DATABASE_NAME";

    /// TenantVault home directory override.
    pub const TENANTVAULT_HOME: &str = "TENANTVAULT_HOME";

    /// TenantVault config file override.
    pub const TENANTVAULT_CONFIG: &str = "TENANTVAULT_CONFIG";

    /// TenantVault log filter.
    pub const TENANTVAULT_LOG: &str = "TENANTVAULT_LOG";

    /// Service-specific database URL variable, e.g. `CREDENTIALS_DATABASE_URL`.
    pub fn service_database_url(service: &str) -> String {
        format!("{}_DATABASE_URL", service.to_uppercase())
    }
}
