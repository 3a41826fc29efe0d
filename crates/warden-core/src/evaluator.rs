//! Policy evaluation

use warden_api::{ViolatedRule, ViolationResult};
use warden_config::Policy;
use warden_util::as_minutes;

use crate::SessionCreationEvent;

/// Evaluate a session against the policy.
///
/// Pure: no external calls. Rules are checked in a fixed order (workers,
/// idle-timeout, vpc, owner). A value the request omitted falls back to the
/// configured service default; with no default either, that rule passes.
pub fn evaluate(event: &SessionCreationEvent, policy: &Policy) -> ViolationResult {
    let limits = &policy.limits;
    let mut rules = Vec::new();

    let workers = event.requested.workers.or(policy.defaults.workers);
    if let Some(requested) = workers
        && requested > limits.max_workers
    {
        rules.push(ViolatedRule::Workers {
            requested,
            limit: limits.max_workers,
        });
    }

    let idle_timeout = event
        .requested
        .idle_timeout
        .or(policy.defaults.idle_timeout);
    if let Some(requested) = idle_timeout
        && requested > limits.max_idle_timeout
    {
        rules.push(ViolatedRule::IdleTimeout {
            requested_minutes: as_minutes(requested),
            limit_minutes: limits.max_idle_timeout_minutes(),
        });
    }

    if limits.enforce_vpc && !event.requested.network_attachment {
        rules.push(ViolatedRule::Vpc);
    }

    if limits.require_owner && event.principal.is_none() {
        rules.push(ViolatedRule::Owner);
    }

    ViolationResult::from_rules(rules)
}
