//! Configuration parsing and validation for session-warden
//!
//! The configuration surface is the process environment, optionally layered
//! over a TOML file named by `WARDEN_CONFIG_FILE`:
//! - Limits: max workers, max idle timeout, VPC and owner requirements
//! - Enforcement: whether to terminate, where to notify
//! - Service defaults for omitted request values
//!
//! All problems are collected and reported together. A missing or unparsable
//! limit is fatal; there is no fallback to "no limits".

mod policy;
mod schema;
mod validation;

pub use policy::*;
pub use schema::*;
pub use validation::*;

use std::path::Path;
use thiserror::Error;
use tracing::debug;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Validation failed: {errors:?}")]
    ValidationFailed { errors: Vec<ValidationError> },
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Load and validate configuration from the process environment
pub fn load_config() -> ConfigResult<Policy> {
    load_config_with(|key| std::env::var(key).ok())
}

/// Load and validate configuration from an arbitrary key lookup.
///
/// If the lookup yields `WARDEN_CONFIG_FILE`, that file is read first and
/// the remaining keys override it.
pub fn load_config_with<F>(lookup: F) -> ConfigResult<Policy>
where
    F: Fn(&str) -> Option<String>,
{
    let mut raw = match lookup(ENV_CONFIG_FILE).filter(|p| !p.trim().is_empty()) {
        Some(path) => {
            debug!(path = %path, "Reading config file");
            read_raw_config(path.trim())?
        }
        None => RawConfig::default(),
    };

    let mut errors = raw.apply_env(&lookup);
    errors.extend(validate_config(&raw));
    finish(raw, errors)
}

/// Load and validate configuration from a TOML file only
pub fn load_config_file(path: impl AsRef<Path>) -> ConfigResult<Policy> {
    let raw = read_raw_config(path)?;
    let errors = validate_config(&raw);
    finish(raw, errors)
}

/// Parse and validate configuration from a TOML string
pub fn parse_config(content: &str) -> ConfigResult<Policy> {
    let raw: RawConfig = toml::from_str(content)?;
    let errors = validate_config(&raw);
    finish(raw, errors)
}

fn read_raw_config(path: impl AsRef<Path>) -> ConfigResult<RawConfig> {
    let content = std::fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

fn finish(raw: RawConfig, errors: Vec<ValidationError>) -> ConfigResult<Policy> {
    if !errors.is_empty() {
        return Err(ConfigError::ValidationFailed { errors });
    }
    Ok(Policy::from_raw(raw))
}
