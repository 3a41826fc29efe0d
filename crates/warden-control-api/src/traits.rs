//! Capability traits

use async_trait::async_trait;
use thiserror::Error;
use warden_api::SessionStatus;
use warden_util::SessionId;

/// Errors from calls into external services
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ControlError {
    #[error("{operation} failed: {message}")]
    Service { operation: String, message: String },

    #[error("{0} timed out")]
    Timeout(String),

    #[error("Session not found: {0}")]
    NotFound(SessionId),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ControlError {
    pub fn service(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Service {
            operation: operation.into(),
            message: message.into(),
        }
    }
}

pub type ControlResult<T> = Result<T, ControlError>;

/// Result of a termination request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminateOutcome {
    /// The session was stopped by this call
    Terminated,
    /// The session was already gone; nothing to do
    AlreadyTerminated,
}

/// Access to the service that owns the sessions
#[async_trait]
pub trait SessionController: Send + Sync {
    /// Query the live status of a session
    async fn session_status(&self, session_id: &SessionId) -> ControlResult<SessionStatus>;

    /// Request termination of a session.
    ///
    /// Implementations report a session that no longer exists as
    /// `AlreadyTerminated`, not as an error.
    async fn terminate(&self, session_id: &SessionId) -> ControlResult<TerminateOutcome>;
}

/// Publish/subscribe notification channel
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn publish(&self, topic: &str, subject: &str, body: &str) -> ControlResult<()>;
}
