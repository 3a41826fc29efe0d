//! Raw configuration schema (as parsed from TOML and the environment)

use serde::{Deserialize, Serialize};

use crate::validation::{parse_bool, parse_u32, ValidationError};

pub const ENV_CONFIG_FILE: &str = "WARDEN_CONFIG_FILE";
pub const ENV_ENFORCE_VPC: &str = "ENFORCE_VPC_CONNECTION";
pub const ENV_MAX_WORKERS: &str = "MAX_WORKERS";
pub const ENV_MAX_IDLE_TIMEOUT: &str = "MAX_IDLE_TIMEOUT_MINUTES";
pub const ENV_KILL_SESSION: &str = "KILL_SESSION";
pub const ENV_REQUIRE_OWNER: &str = "REQUIRE_SESSION_OWNER";
pub const ENV_NOTIFICATION_TARGET: &str = "EMAIL_SNS_ARN";
pub const ENV_DEFAULT_WORKERS: &str = "DEFAULT_WORKERS";
pub const ENV_DEFAULT_IDLE_TIMEOUT: &str = "DEFAULT_IDLE_TIMEOUT_MINUTES";

/// Raw configuration
///
/// Every field is optional here; required keys are enforced by
/// [`crate::validate_config`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RawConfig {
    /// Require a VPC connection on every session
    pub enforce_vpc_connection: Option<bool>,

    /// Maximum workers per session (required)
    pub max_workers: Option<u32>,

    /// Maximum idle timeout in minutes (required)
    pub max_idle_timeout_minutes: Option<u32>,

    /// Terminate violating sessions (default: true)
    pub kill_session: Option<bool>,

    /// Require sessions to be attributable to a user (default: true)
    pub require_session_owner: Option<bool>,

    /// SNS topic ARN for violation notices; empty disables
    pub email_sns_arn: Option<String>,

    /// Worker count the owning service applies when a request omits it
    pub default_workers: Option<u32>,

    /// Idle timeout in minutes the owning service applies when a request omits it
    pub default_idle_timeout_minutes: Option<u32>,
}

impl RawConfig {
    /// Overlay values from an environment lookup.
    ///
    /// Empty values leave the field untouched, except for the notification
    /// target where an empty string explicitly disables notifications.
    /// Returns every parse error encountered rather than stopping at the first.
    pub fn apply_env<F>(&mut self, lookup: F) -> Vec<ValidationError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut errors = Vec::new();

        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        overlay(
            &mut self.enforce_vpc_connection,
            ENV_ENFORCE_VPC,
            get(ENV_ENFORCE_VPC),
            parse_bool,
            &mut errors,
        );
        overlay(
            &mut self.max_workers,
            ENV_MAX_WORKERS,
            get(ENV_MAX_WORKERS),
            parse_u32,
            &mut errors,
        );
        overlay(
            &mut self.max_idle_timeout_minutes,
            ENV_MAX_IDLE_TIMEOUT,
            get(ENV_MAX_IDLE_TIMEOUT),
            parse_u32,
            &mut errors,
        );
        overlay(
            &mut self.kill_session,
            ENV_KILL_SESSION,
            get(ENV_KILL_SESSION),
            parse_bool,
            &mut errors,
        );
        overlay(
            &mut self.require_session_owner,
            ENV_REQUIRE_OWNER,
            get(ENV_REQUIRE_OWNER),
            parse_bool,
            &mut errors,
        );
        overlay(
            &mut self.default_workers,
            ENV_DEFAULT_WORKERS,
            get(ENV_DEFAULT_WORKERS),
            parse_u32,
            &mut errors,
        );
        overlay(
            &mut self.default_idle_timeout_minutes,
            ENV_DEFAULT_IDLE_TIMEOUT,
            get(ENV_DEFAULT_IDLE_TIMEOUT),
            parse_u32,
            &mut errors,
        );

        if let Some(target) = lookup(ENV_NOTIFICATION_TARGET) {
            self.email_sns_arn = Some(target.trim().to_string());
        }

        errors
    }
}

fn overlay<T>(
    field: &mut Option<T>,
    key: &str,
    value: Option<String>,
    parse: fn(&str) -> Result<T, String>,
    errors: &mut Vec<ValidationError>,
) {
    let Some(value) = value else {
        return;
    };
    match parse(&value) {
        Ok(parsed) => *field = Some(parsed),
        Err(message) => errors.push(ValidationError::InvalidValue {
            key: key.to_string(),
            value,
            message,
        }),
    }
}
