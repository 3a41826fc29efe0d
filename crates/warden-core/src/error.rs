//! Error types for enforcement

use std::time::Duration;
use thiserror::Error;
use warden_api::SessionStatus;
use warden_control_api::ControlError;
use warden_util::SessionId;

/// Faults surfaced to the invoking host
#[derive(Debug, Error)]
pub enum EnforcementError {
    /// The event is not a CreateSession record we can act on
    #[error("Malformed event: {0}")]
    MalformedEvent(String),

    /// The session never became terminable within the wait budget
    #[error("Session {session_id} not terminable after {waited:?} (last status: {last_status:?})")]
    SessionWaitTimeout {
        session_id: SessionId,
        waited: Duration,
        last_status: Option<SessionStatus>,
    },

    #[error("Status query for session {session_id} failed: {source}")]
    StatusQuery {
        session_id: SessionId,
        #[source]
        source: ControlError,
    },

    /// Termination and/or notification failed after both were attempted
    #[error(
        "Enforcement failed for session {session_id}: {}",
        describe_failures(.termination, .notification)
    )]
    EnforcementFailed {
        session_id: SessionId,
        termination: Option<ControlError>,
        notification: Option<ControlError>,
    },
}

impl EnforcementError {
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedEvent(msg.into())
    }

    /// Whether redelivering the same event could succeed.
    ///
    /// A malformed event fails the same way every time.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, EnforcementError::MalformedEvent(_))
    }

    /// Stable short name for structured logs
    pub fn kind(&self) -> &'static str {
        match self {
            EnforcementError::MalformedEvent(_) => "malformed_event",
            EnforcementError::SessionWaitTimeout { .. } => "session_wait_timeout",
            EnforcementError::StatusQuery { .. } => "status_query",
            EnforcementError::EnforcementFailed { .. } => "enforcement_failed",
        }
    }
}

fn describe_failures(
    termination: &Option<ControlError>,
    notification: &Option<ControlError>,
) -> String {
    match (termination, notification) {
        (Some(t), Some(n)) => format!("termination: {}; notification: {}", t, n),
        (Some(t), None) => format!("termination: {}", t),
        (None, Some(n)) => format!("notification: {}", n),
        (None, None) => "no failure recorded".into(),
    }
}

pub type EnforcementResult<T> = Result<T, EnforcementError>;
