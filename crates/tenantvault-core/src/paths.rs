//! Path resolution utilities.

use crate::env;
use crate::error::ConfigError;
use std::path::PathBuf;

/// Get the TenantVault base directory.
///
/// `TENANTVAULT_HOME` wins when set, otherwise `~/.tenantvault`.
pub fn base_dir() -> Result<PathBuf, ConfigError> {
    if let Some(home) = env::get_var(env::vars::TENANTVAULT_HOME) {
        return Ok(expand_tilde(&home));
    }
    let home = dirs::home_dir().ok_or(ConfigError::NoHomeDir)?;
    Ok(home.join(".tenantvault"))
}

/// Get the main config file path (`{base}/tenantvault.json5`).
pub fn config_file() -> Result<PathBuf, ConfigError> {
    Ok(base_dir()?.join("tenantvault.json5"))
}

/// Get the default SQLite database path (`{base}/credentials.db`).
pub fn database_file() -> Result<PathBuf, ConfigError> {
    Ok(base_dir()?.join("credentials.db"))
}

/// Ensure the base directory exists, with mode 0700 on Unix.
pub fn ensure_base_dir() -> Result<PathBuf, ConfigError> {
    let dir = base_dir()?;
    std::fs::create_dir_all(&dir)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(&dir, std::fs::Permissions::from_mode(0o700))?;
    }

    Ok(dir)
}

/// Expand tilde (~) in a path.
pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}
