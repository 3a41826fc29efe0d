//! Enforcement actions

use tracing::{error, info, warn};
use warden_api::{Disposition, EnforcementOutcome, ViolationResult};
use warden_config::PolicyLimits;
use warden_control_api::{Notifier, SessionController, TerminateOutcome};

use crate::{EnforcementError, EnforcementResult, SessionCreationEvent, ViolationNotice};

/// Applies the configured enforcement actions to a violating session.
///
/// Termination is attempted before notification so the notice can say
/// whether the session was closed. A failure in one action does not skip
/// the other; both causes are reported together.
pub struct EnforcementExecutor<'a> {
    controller: &'a dyn SessionController,
    notifier: &'a dyn Notifier,
    limits: &'a PolicyLimits,
}

impl<'a> EnforcementExecutor<'a> {
    pub fn new(
        controller: &'a dyn SessionController,
        notifier: &'a dyn Notifier,
        limits: &'a PolicyLimits,
    ) -> Self {
        Self {
            controller,
            notifier,
            limits,
        }
    }

    pub async fn execute(
        &self,
        event: &SessionCreationEvent,
        violations: ViolationResult,
    ) -> EnforcementResult<EnforcementOutcome> {
        let session_id = &event.session_id;

        if !violations.has_violation() {
            return Ok(EnforcementOutcome::compliant(session_id.clone()));
        }

        let mut outcome = EnforcementOutcome::untouched(
            session_id.clone(),
            Disposition::Enforced,
            violations,
        );
        let mut termination_error = None;
        let mut notification_error = None;

        if self.limits.kill_on_violation {
            outcome.termination_attempted = true;
            match self.controller.terminate(session_id).await {
                Ok(TerminateOutcome::Terminated) => {
                    info!(session_id = %session_id, "Session terminated");
                    outcome.termination_succeeded = true;
                }
                Ok(TerminateOutcome::AlreadyTerminated) => {
                    info!(session_id = %session_id, "Session was already terminated");
                    outcome.termination_succeeded = true;
                }
                Err(e) => {
                    error!(session_id = %session_id, error = %e, "Termination failed");
                    termination_error = Some(e);
                }
            }
        }

        if let Some(topic) = &self.limits.notification_target {
            let notice =
                ViolationNotice::new(event, &outcome.violations, outcome.termination_succeeded);
            match self
                .notifier
                .publish(topic, &notice.subject, &notice.body)
                .await
            {
                Ok(()) => {
                    info!(session_id = %session_id, topic = %topic, "Violation notice sent");
                    outcome.notification_sent = true;
                }
                Err(e) => {
                    error!(session_id = %session_id, error = %e, "Notification failed");
                    notification_error = Some(e);
                }
            }
        } else if !self.limits.kill_on_violation {
            warn!(
                session_id = %session_id,
                "Violation detected but neither termination nor notification is configured"
            );
        }

        if termination_error.is_some() || notification_error.is_some() {
            return Err(EnforcementError::EnforcementFailed {
                session_id: session_id.clone(),
                termination: termination_error,
                notification: notification_error,
            });
        }

        Ok(outcome)
    }
}
