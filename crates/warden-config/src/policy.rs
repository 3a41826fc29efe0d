//! Validated policy structures

use crate::schema::RawConfig;
use std::time::Duration;
use warden_util::{as_minutes, minutes};

/// Interval between session status queries
pub const POLL_INTERVAL: Duration = Duration::from_secs(3);

/// Upper bound on waiting for a session to become terminable
pub const WAIT_BUDGET: Duration = Duration::from_secs(120);

/// Time reserved at the end of an invocation for termination and notification
pub const INVOCATION_HEADROOM: Duration = Duration::from_secs(15);

/// Validated policy, built once at cold start and shared read-only
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Policy {
    pub limits: PolicyLimits,
    pub defaults: SessionDefaults,
    pub wait: WaitPolicy,
}

impl Policy {
    /// Convert from raw config. Only called after validation, which
    /// guarantees the required limits are present.
    pub(crate) fn from_raw(raw: RawConfig) -> Self {
        let notification_target = raw.email_sns_arn.filter(|t| !t.is_empty());

        Self {
            limits: PolicyLimits {
                max_workers: raw.max_workers.unwrap_or_default(),
                max_idle_timeout: minutes(raw.max_idle_timeout_minutes.unwrap_or_default()),
                enforce_vpc: raw.enforce_vpc_connection.unwrap_or(false),
                kill_on_violation: raw.kill_session.unwrap_or(true),
                require_owner: raw.require_session_owner.unwrap_or(true),
                notification_target,
            },
            defaults: SessionDefaults {
                workers: raw.default_workers,
                idle_timeout: raw.default_idle_timeout_minutes.map(minutes),
            },
            wait: WaitPolicy::default(),
        }
    }
}

/// Limits a session must respect
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyLimits {
    pub max_workers: u32,
    pub max_idle_timeout: Duration,
    pub enforce_vpc: bool,
    pub kill_on_violation: bool,
    pub require_owner: bool,
    /// SNS topic ARN; `None` disables notifications
    pub notification_target: Option<String>,
}

impl PolicyLimits {
    pub fn max_idle_timeout_minutes(&self) -> u64 {
        as_minutes(self.max_idle_timeout)
    }
}

/// Values the owning service applies when a request omits them.
/// `None` means unknown, which the evaluator treats as compliant.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionDefaults {
    pub workers: Option<u32>,
    pub idle_timeout: Option<Duration>,
}

/// Bounds for waiting on a provisioning session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitPolicy {
    pub poll_interval: Duration,
    pub budget: Duration,
    /// Kept free before the invocation deadline
    pub headroom: Duration,
}

impl Default for WaitPolicy {
    fn default() -> Self {
        Self {
            poll_interval: POLL_INTERVAL,
            budget: WAIT_BUDGET,
            headroom: INVOCATION_HEADROOM,
        }
    }
}

impl WaitPolicy {
    /// Wait budget for an invocation with `remaining` time left, if known
    pub fn effective_budget(&self, remaining: Option<Duration>) -> Duration {
        match remaining {
            Some(remaining) => self.budget.min(remaining.saturating_sub(self.headroom)),
            None => self.budget,
        }
    }
}
