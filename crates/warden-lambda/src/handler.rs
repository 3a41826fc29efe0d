//! Invocation handling

use lambda_runtime::LambdaEvent;
use serde_json::Value;
use std::time::{Duration, SystemTime};
use tracing::{error, info, warn};
use warden_core::{EnforcementError, Enforcer};
use warden_util::remaining_until_epoch_millis;

/// Lambda handler: run one event through the enforcer.
///
/// Any error fails the invocation so the platform retries or dead-letters
/// the event.
pub async fn handle_event(
    enforcer: &Enforcer,
    event: LambdaEvent<Value>,
) -> Result<Value, lambda_runtime::Error> {
    let remaining = remaining_until_epoch_millis(event.context.deadline, SystemTime::now());
    info!(
        request_id = %event.context.request_id,
        remaining_ms = remaining.map(|r| r.as_millis() as u64),
        "Invocation started"
    );

    Ok(process(enforcer, &event.payload, remaining).await?)
}

/// Enforce a single raw event and render the outcome as JSON
pub async fn process(
    enforcer: &Enforcer,
    payload: &Value,
    remaining: Option<Duration>,
) -> Result<Value, EnforcementError> {
    match enforcer.handle(payload, remaining).await {
        Ok(outcome) => {
            info!(
                session_id = %outcome.session_id,
                disposition = ?outcome.disposition,
                violations = ?outcome.violations.rule_names(),
                terminated = outcome.termination_succeeded,
                notified = outcome.notification_sent,
                "Invocation finished"
            );
            // Outcome only holds strings, numbers and enums
            Ok(serde_json::to_value(&outcome).unwrap_or(Value::Null))
        }
        Err(err) => {
            match &err {
                EnforcementError::SessionWaitTimeout { .. } => {
                    warn!(kind = err.kind(), error = %err, "Invocation failed, will be retried")
                }
                _ => error!(
                    kind = err.kind(),
                    retryable = err.is_retryable(),
                    error = %err,
                    "Invocation failed"
                ),
            }
            Err(err)
        }
    }
}
