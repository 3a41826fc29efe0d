//! Per-invocation enforcement pipeline

use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use warden_api::{Disposition, EnforcementOutcome, ViolationResult};
use warden_config::Policy;
use warden_control_api::{Notifier, SessionController};

use crate::{
    evaluate, parse_event, wait_until_terminable, EnforcementExecutor, EnforcementResult,
    ParsedEvent, SessionCreationEvent,
};

/// Parses, evaluates and enforces session creation events.
///
/// Built once at cold start and shared by every invocation. Holds no
/// mutable state, so concurrent invocations need no locking.
pub struct Enforcer {
    policy: Arc<Policy>,
    controller: Arc<dyn SessionController>,
    notifier: Arc<dyn Notifier>,
}

impl Enforcer {
    pub fn new(
        policy: Arc<Policy>,
        controller: Arc<dyn SessionController>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        info!(
            max_workers = policy.limits.max_workers,
            max_idle_timeout_minutes = policy.limits.max_idle_timeout_minutes(),
            enforce_vpc = policy.limits.enforce_vpc,
            require_owner = policy.limits.require_owner,
            kill_on_violation = policy.limits.kill_on_violation,
            notify = policy.limits.notification_target.is_some(),
            "Enforcer initialized"
        );

        Self {
            policy,
            controller,
            notifier,
        }
    }

    pub fn policy(&self) -> &Policy {
        &self.policy
    }

    /// Handle one raw event.
    ///
    /// `remaining` is the time left before the host cancels the invocation,
    /// if known.
    pub async fn handle(
        &self,
        raw: &serde_json::Value,
        remaining: Option<Duration>,
    ) -> EnforcementResult<EnforcementOutcome> {
        match parse_event(raw)? {
            ParsedEvent::Created(event) => self.enforce(&event, remaining).await,
            ParsedEvent::CreationFailed {
                request_id,
                error_code,
            } => {
                info!(
                    request_id = %request_id,
                    error_code = error_code.as_deref().unwrap_or("unknown"),
                    "Session creation failed, nothing to enforce"
                );
                Ok(EnforcementOutcome::untouched(
                    request_id,
                    Disposition::SkippedCreationFailed,
                    ViolationResult::compliant(),
                ))
            }
        }
    }

    /// Evaluate and enforce an already parsed event
    pub async fn enforce(
        &self,
        event: &SessionCreationEvent,
        remaining: Option<Duration>,
    ) -> EnforcementResult<EnforcementOutcome> {
        let session_id = &event.session_id;
        let violations = evaluate(event, &self.policy);

        if !violations.has_violation() {
            debug!(session_id = %session_id, "Session is compliant");
            return Ok(EnforcementOutcome::compliant(session_id.clone()));
        }

        for rule in violations.rules() {
            warn!(
                session_id = %session_id,
                principal = event.principal.as_ref().map(|p| p.as_str()).unwrap_or("unknown"),
                rule = rule.name(),
                requested = %rule.requested_value(),
                limit = %rule.limit_value(),
                "Policy violation"
            );
        }

        // Only termination needs the session out of provisioning
        if self.policy.limits.kill_on_violation {
            let status = wait_until_terminable(
                self.controller.as_ref(),
                session_id,
                &self.policy.wait,
                remaining,
            )
            .await?;

            if !status.is_terminable() {
                info!(
                    session_id = %session_id,
                    status = %status,
                    "Session gone before it became terminable"
                );
                return Ok(EnforcementOutcome::untouched(
                    session_id.clone(),
                    Disposition::SkippedSessionGone { status },
                    violations,
                ));
            }
        }

        EnforcementExecutor::new(
            self.controller.as_ref(),
            self.notifier.as_ref(),
            &self.policy.limits,
        )
        .execute(event, violations)
        .await
    }
}
