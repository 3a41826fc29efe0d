//! Waiting for a session to leave provisioning
//!
//! The owning service rejects termination while a session is still
//! provisioning. The waiter polls status at a fixed interval until the
//! session reaches any non-provisioning status or the deadline passes.
//! The deadline is fixed when waiting starts, so a slow status query
//! cannot stretch the total wait.

use std::time::Duration;
use tokio::time::{sleep_until, timeout_at, Instant};
use tracing::{debug, warn};
use warden_api::SessionStatus;
use warden_config::WaitPolicy;
use warden_control_api::SessionController;
use warden_util::SessionId;

use crate::{EnforcementError, EnforcementResult};

/// Poll until the session reaches a status other than `Provisioning`.
///
/// `remaining` is the time left in the current invocation, if known; the
/// wait never eats into the policy's headroom. Returns the first
/// non-provisioning status observed, which may be `Failed` or
/// `AlreadyTerminated` as well as `Ready`.
pub async fn wait_until_terminable(
    controller: &dyn SessionController,
    session_id: &SessionId,
    wait: &WaitPolicy,
    remaining: Option<Duration>,
) -> EnforcementResult<SessionStatus> {
    let started = Instant::now();
    let deadline = started + wait.effective_budget(remaining);
    let mut last_status = None;
    let mut polls = 0u32;

    loop {
        let query = controller.session_status(session_id);
        let status = match timeout_at(deadline, query).await {
            Ok(Ok(status)) => status,
            Ok(Err(source)) => {
                return Err(EnforcementError::StatusQuery {
                    session_id: session_id.clone(),
                    source,
                });
            }
            Err(_) => break,
        };
        polls += 1;

        if status.is_terminal() {
            debug!(
                session_id = %session_id,
                status = %status,
                polls,
                waited_ms = started.elapsed().as_millis() as u64,
                "Session left provisioning"
            );
            return Ok(status);
        }
        last_status = Some(status);

        let now = Instant::now();
        if now >= deadline {
            break;
        }
        sleep_until((now + wait.poll_interval).min(deadline)).await;
        if Instant::now() >= deadline {
            break;
        }
    }

    let waited = started.elapsed();
    warn!(
        session_id = %session_id,
        polls,
        waited_ms = waited.as_millis() as u64,
        "Session still provisioning at wait deadline"
    );

    Err(EnforcementError::SessionWaitTimeout {
        session_id: session_id.clone(),
        waited,
        last_status,
    })
}
