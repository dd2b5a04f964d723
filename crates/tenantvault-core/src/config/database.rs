//! Database connection string resolution.
//!
//! Each service may get its own database. Resolution order:
//! 1. `{SERVICE}_DATABASE_URL`
//! 2. `credentials.database_url` from the config file
//! 3. `DATABASE_URL` with its last path segment replaced by `DATABASE_NAME`
//!    (or `tenantvault_{service}`)
//! 4. a SQLite file under the base directory

use super::Config;
use crate::env;
use crate::error::ConfigError;
use crate::paths;
use std::path::PathBuf;

/// Service name of the credential store.
pub const CREDENTIALS_SERVICE: &str = "credentials";

impl Config {
    /// Resolve the database URL for `service` from config and environment.
    pub fn database_url(&self, service: &str) -> Result<String, ConfigError> {
        resolve_database_url(
            service,
            self.credentials.database_url.as_deref(),
            env::get_var,
            paths::database_file,
        )
    }
}

/// Resolve a database URL with an injectable environment lookup.
///
/// The credential store only speaks SQLite, so any other scheme is rejected
/// here rather than at connect time.
pub fn resolve_database_url<F, D>(
    service: &str,
    configured: Option<&str>,
    lookup: F,
    default_file: D,
) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    D: FnOnce() -> Result<PathBuf, ConfigError>,
{
    let service_var = env::vars::service_database_url(service);
    if let Some(url) = lookup(&service_var) {
        return ensure_sqlite(url, &service_var);
    }

    if let Some(url) = configured {
        return ensure_sqlite(url.to_string(), "credentials.database_url");
    }

    if let Some(shared) = lookup(env::vars::DATABASE_URL) {
        let shared = ensure_sqlite(shared, env::vars::DATABASE_URL)?;
        let name = lookup(env::vars::DATABASE_NAME)
            .unwrap_or_else(|| format!("tenantvault_{service}"));
        return Ok(with_database_name(&shared, &name));
    }

    let path = default_file()?;
    Ok(format!("sqlite://{}", path.display()))
}

/// Accept only `sqlite:` URLs. The error names the source and scheme, never
/// the full URL, which may carry a password.
pub fn ensure_sqlite(url: String, source: &str) -> Result<String, ConfigError> {
    if url.starts_with("sqlite:") {
        return Ok(url);
    }
    let scheme = url.split_once(':').map_or("<none>", |(scheme, _)| scheme);
    Err(ConfigError::Invalid(vec![format!(
        "{source} must be a sqlite: URL, got scheme {scheme}"
    )]))
}

/// Replace the database file name of a SQLite `url` with `name`, keeping the
/// directory and any query string. `.db` is appended when `name` has no
/// extension. In-memory and non-SQLite URLs are returned unchanged.
pub fn with_database_name(url: &str, name: &str) -> String {
    let (base, query) = match url.split_once('?') {
        Some((base, query)) => (base, Some(query)),
        None => (url, None),
    };
    let Some(rest) = base.strip_prefix("sqlite:") else {
        return url.to_string();
    };
    // `sqlite://main.db` and `sqlite:main.db` both name a relative file
    let path = rest.strip_prefix("//").unwrap_or(rest);
    if path.is_empty() || path == ":memory:" {
        return url.to_string();
    }

    let dir_len = path.rfind('/').map_or(0, |i| i + 1);
    let prefix_len = base.len() - path.len() + dir_len;

    let mut out = format!("{}{}", &base[..prefix_len], name);
    if !name.contains('.') {
        out.push_str(".db");
    }
    if let Some(query) = query {
        out.push('?');
        out.push_str(query);
    }
    out
}
