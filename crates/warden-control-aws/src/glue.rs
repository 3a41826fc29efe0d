//! Glue interactive session controller

use async_trait::async_trait;
use aws_sdk_glue::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_glue::types::SessionStatus as GlueSessionStatus;
use tracing::{debug, warn};
use warden_api::SessionStatus;
use warden_control_api::{ControlError, ControlResult, SessionController, TerminateOutcome};
use warden_util::SessionId;

const ENTITY_NOT_FOUND: &str = "EntityNotFoundException";

/// Session controller backed by the Glue API
pub struct GlueSessionController {
    client: aws_sdk_glue::Client,
}

impl GlueSessionController {
    pub fn new(config: &aws_config::SdkConfig) -> Self {
        Self {
            client: aws_sdk_glue::Client::new(config),
        }
    }

    pub fn from_client(client: aws_sdk_glue::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SessionController for GlueSessionController {
    async fn session_status(&self, session_id: &SessionId) -> ControlResult<SessionStatus> {
        match self.client.get_session().id(session_id.as_str()).send().await {
            Ok(output) => {
                let status = output
                    .session()
                    .and_then(|s| s.status())
                    .map(map_status)
                    .unwrap_or(SessionStatus::Provisioning);
                debug!(session_id = %session_id, status = %status, "Session status");
                Ok(status)
            }
            Err(err) if is_not_found(&err) => {
                debug!(session_id = %session_id, "Session no longer exists");
                Ok(SessionStatus::AlreadyTerminated)
            }
            Err(err) => Err(ControlError::service(
                "GetSession",
                DisplayErrorContext(&err).to_string(),
            )),
        }
    }

    async fn terminate(&self, session_id: &SessionId) -> ControlResult<TerminateOutcome> {
        match self.client.delete_session().id(session_id.as_str()).send().await {
            Ok(_) => Ok(TerminateOutcome::Terminated),
            Err(err) if is_not_found(&err) => Ok(TerminateOutcome::AlreadyTerminated),
            Err(err) => {
                warn!(
                    session_id = %session_id,
                    code = err
                        .as_service_error()
                        .and_then(|e| e.code())
                        .unwrap_or("unknown"),
                    "DeleteSession rejected"
                );
                Err(ControlError::service(
                    "DeleteSession",
                    DisplayErrorContext(&err).to_string(),
                ))
            }
        }
    }
}

fn is_not_found<E, R>(err: &SdkError<E, R>) -> bool
where
    E: ProvideErrorMetadata,
{
    err.as_service_error()
        .and_then(|e| e.code())
        .is_some_and(|code| code == ENTITY_NOT_FOUND)
}

/// Map the Glue lifecycle onto the statuses the waiter understands.
///
/// Statuses added to the API later are treated as still provisioning so the
/// waiter keeps polling until its deadline instead of acting on them.
pub fn map_status(status: &GlueSessionStatus) -> SessionStatus {
    match status {
        GlueSessionStatus::Provisioning => SessionStatus::Provisioning,
        GlueSessionStatus::Ready => SessionStatus::Ready,
        GlueSessionStatus::Failed | GlueSessionStatus::Timeout => SessionStatus::Failed,
        GlueSessionStatus::Stopping | GlueSessionStatus::Stopped => SessionStatus::Terminated,
        other => {
            warn!(status = other.as_str(), "Unrecognized Glue session status");
            SessionStatus::Provisioning
        }
    }
}
