//! Configuration validation

use crate::schema::{
    RawConfig, ENV_MAX_IDLE_TIMEOUT, ENV_MAX_WORKERS, ENV_NOTIFICATION_TARGET,
};
use thiserror::Error;

/// Validation error
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Missing required setting {key}")]
    MissingRequired { key: String },

    #[error("Invalid value '{value}' for {key}: {message}")]
    InvalidValue {
        key: String,
        value: String,
        message: String,
    },

    #[error("Invalid notification target '{value}': {message}")]
    InvalidNotificationTarget { value: String, message: String },
}

/// Validate a raw configuration
///
/// Limits have no implicit default: a missing limit is an error, never
/// "unlimited".
pub fn validate_config(config: &RawConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if config.max_workers.is_none() {
        errors.push(ValidationError::MissingRequired {
            key: ENV_MAX_WORKERS.into(),
        });
    }

    if config.max_idle_timeout_minutes.is_none() {
        errors.push(ValidationError::MissingRequired {
            key: ENV_MAX_IDLE_TIMEOUT.into(),
        });
    }

    if let Some(target) = &config.email_sns_arn
        && !target.is_empty()
        && let Err(message) = validate_topic_arn(target)
    {
        errors.push(ValidationError::InvalidNotificationTarget {
            value: target.clone(),
            message,
        });
    }

    errors
}

/// Check the shape of an SNS topic ARN: `arn:<partition>:sns:<region>:<account>:<name>`
fn validate_topic_arn(arn: &str) -> Result<(), String> {
    let parts: Vec<&str> = arn.split(':').collect();
    if parts.len() != 6 || parts[0] != "arn" {
        return Err(format!("expected an ARN for {}", ENV_NOTIFICATION_TARGET));
    }
    if parts[2] != "sns" {
        return Err(format!("expected an sns ARN, got service '{}'", parts[2]));
    }
    if parts[5].is_empty() {
        return Err("topic name is empty".into());
    }
    Ok(())
}

/// Parse a boolean flag
pub fn parse_bool(s: &str) -> Result<bool, String> {
    match s.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        other => Err(format!("expected true/false, got '{}'", other)),
    }
}

/// Parse a non-negative integer
pub fn parse_u32(s: &str) -> Result<u32, String> {
    let s = s.trim();
    if s.starts_with('-') {
        return Err("must be non-negative".into());
    }
    s.parse().map_err(|_| "expected a whole number".to_string())
}
