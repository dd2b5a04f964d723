//! # tenantvault-core
//!
//! Configuration and shared utilities for TenantVault.
//!
//! - **Configuration**: JSON5 config file, environment overrides, validation
//! - **Database URLs**: per-service connection string resolution
//! - **Utilities**: path resolution, environment helpers, [`SecretString`]

pub mod config;
pub mod env;
pub mod error;
pub mod paths;
pub mod secret;

// Re-exports for convenience
pub use config::Config;
pub use error::ConfigError;
pub use secret::SecretString;
