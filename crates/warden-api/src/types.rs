//! Shared domain types

use serde::{Deserialize, Serialize};
use std::fmt;
use warden_util::SessionId;

/// Live status of a session as reported by the owning service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionStatus {
    /// Still being set up; termination calls are rejected
    Provisioning,
    /// Running and terminable
    Ready,
    /// Setup failed or the session timed out
    Failed,
    /// The owning service no longer knows the session
    AlreadyTerminated,
    /// Stopping or stopped
    Terminated,
}

impl SessionStatus {
    /// Anything other than `Provisioning` ends the wait
    pub fn is_terminal(&self) -> bool {
        !matches!(self, SessionStatus::Provisioning)
    }

    pub fn is_terminable(&self) -> bool {
        matches!(self, SessionStatus::Ready)
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SessionStatus::Provisioning => "PROVISIONING",
            SessionStatus::Ready => "READY",
            SessionStatus::Failed => "FAILED",
            SessionStatus::AlreadyTerminated => "ALREADY_TERMINATED",
            SessionStatus::Terminated => "TERMINATED",
        };
        f.write_str(s)
    }
}

/// A single breached limit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "kebab-case")]
pub enum ViolatedRule {
    Workers { requested: u32, limit: u32 },
    IdleTimeout { requested_minutes: u64, limit_minutes: u64 },
    Vpc,
    Owner,
}

impl ViolatedRule {
    /// Stable rule name used in logs and notifications
    pub fn name(&self) -> &'static str {
        match self {
            ViolatedRule::Workers { .. } => "workers",
            ViolatedRule::IdleTimeout { .. } => "idle-timeout",
            ViolatedRule::Vpc => "vpc",
            ViolatedRule::Owner => "owner",
        }
    }

    pub fn requested_value(&self) -> String {
        match self {
            ViolatedRule::Workers { requested, .. } => requested.to_string(),
            ViolatedRule::IdleTimeout { requested_minutes, .. } => requested_minutes.to_string(),
            ViolatedRule::Vpc => "none".into(),
            ViolatedRule::Owner => "unresolved".into(),
        }
    }

    pub fn limit_value(&self) -> String {
        match self {
            ViolatedRule::Workers { limit, .. } => limit.to_string(),
            ViolatedRule::IdleTimeout { limit_minutes, .. } => limit_minutes.to_string(),
            ViolatedRule::Vpc | ViolatedRule::Owner => "required".into(),
        }
    }
}

impl fmt::Display for ViolatedRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViolatedRule::Workers { .. } | ViolatedRule::IdleTimeout { .. } => write!(
                f,
                "{}: {} > {}",
                self.name(),
                self.requested_value(),
                self.limit_value()
            ),
            ViolatedRule::Vpc => write!(f, "vpc: no network attachment (required)"),
            ViolatedRule::Owner => write!(f, "owner: unresolved (required)"),
        }
    }
}

/// Result of evaluating a session against the policy
///
/// `has_violation()` is derived from the rule list, so the two can never
/// disagree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViolationResult {
    rules: Vec<ViolatedRule>,
}

impl ViolationResult {
    pub fn compliant() -> Self {
        Self::default()
    }

    pub fn from_rules(rules: Vec<ViolatedRule>) -> Self {
        Self { rules }
    }

    pub fn has_violation(&self) -> bool {
        !self.rules.is_empty()
    }

    /// Violated rules in evaluation order
    pub fn rules(&self) -> &[ViolatedRule] {
        &self.rules
    }

    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(ViolatedRule::name).collect()
    }

    pub fn find(&self, name: &str) -> Option<&ViolatedRule> {
        self.rules.iter().find(|r| r.name() == name)
    }
}

/// What the enforcer ended up doing with an event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Disposition {
    /// No limit breached
    Compliant,
    /// Violation handled (terminated and/or notified)
    Enforced,
    /// The CreateSession call itself failed; there is no session to act on
    SkippedCreationFailed,
    /// The session failed or disappeared before it became terminable
    SkippedSessionGone { status: SessionStatus },
}

/// Observability record of a single invocation. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnforcementOutcome {
    pub session_id: SessionId,
    pub disposition: Disposition,
    pub violations: ViolationResult,
    pub termination_attempted: bool,
    pub termination_succeeded: bool,
    pub notification_sent: bool,
}

impl EnforcementOutcome {
    /// An outcome with no side effects
    pub fn untouched(
        session_id: SessionId,
        disposition: Disposition,
        violations: ViolationResult,
    ) -> Self {
        Self {
            session_id,
            disposition,
            violations,
            termination_attempted: false,
            termination_succeeded: false,
            notification_sent: false,
        }
    }

    pub fn compliant(session_id: SessionId) -> Self {
        Self::untouched(session_id, Disposition::Compliant, ViolationResult::compliant())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_statuses() {
        assert!(!SessionStatus::Provisioning.is_terminal());
        assert!(SessionStatus::Ready.is_terminal());
        assert!(SessionStatus::Failed.is_terminal());
        assert!(SessionStatus::AlreadyTerminated.is_terminal());
        assert!(SessionStatus::Terminated.is_terminal());

        assert!(SessionStatus::Ready.is_terminable());
        assert!(!SessionStatus::Failed.is_terminable());
    }

    #[test]
    fn rule_display() {
        let workers = ViolatedRule::Workers {
            requested: 20,
            limit: 15,
        };
        assert_eq!(workers.to_string(), "workers: 20 > 15");

        let idle = ViolatedRule::IdleTimeout {
            requested_minutes: 2880,
            limit_minutes: 300,
        };
        assert_eq!(idle.to_string(), "idle-timeout: 2880 > 300");
        assert_eq!(ViolatedRule::Vpc.name(), "vpc");
    }

    #[test]
    fn violation_result_invariant() {
        assert!(!ViolationResult::compliant().has_violation());
        assert!(!ViolationResult::from_rules(vec![]).has_violation());

        let result = ViolationResult::from_rules(vec![ViolatedRule::Vpc, ViolatedRule::Owner]);
        assert!(result.has_violation());
        assert_eq!(result.rule_names(), vec!["vpc", "owner"]);
    }

    #[test]
    fn outcome_serializes_disposition_tag() {
        let outcome = EnforcementOutcome::untouched(
            SessionId::new("s-1"),
            Disposition::SkippedSessionGone {
                status: SessionStatus::Failed,
            },
            ViolationResult::from_rules(vec![ViolatedRule::Vpc]),
        );
        let json = serde_json::to_value(&outcome).unwrap();

        assert_eq!(json["disposition"]["kind"], "skipped_session_gone");
        assert_eq!(json["disposition"]["status"], "FAILED");
        assert_eq!(json["violations"]["rules"][0]["rule"], "vpc");
    }
}
