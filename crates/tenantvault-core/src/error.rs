//! Errors raised while locating, reading or checking configuration.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file {} does not exist", .0.display())]
    NotFound(PathBuf),

    #[error("invalid config syntax: {0}")]
    Syntax(String),

    /// Every problem found by `Config::validate`, in check order.
    #[error("invalid config: {}", .0.join("; "))]
    Invalid(Vec<String>),

    #[error("cannot determine the home directory")]
    NoHomeDir,

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
