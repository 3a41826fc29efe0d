//! Event parsing
//!
//! Turns a raw EventBridge envelope into a [`SessionCreationEvent`]. No
//! external calls happen here, so a malformed event is rejected before the
//! owning service is ever contacted.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::time::Duration;
use warden_api::{
    CloudTrailDetail, EventEnvelope, NumericField, RequestParameters, ResponseElements,
    CREATE_SESSION_EVENT, GLUE_EVENT_SOURCE,
};
use warden_util::{minutes, PrincipalId, SessionId};

use crate::{EnforcementError, EnforcementResult};

/// Configuration requested at session creation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestedConfig {
    /// `None` means the service default applies
    pub workers: Option<u32>,
    /// `None` means the service default applies
    pub idle_timeout: Option<Duration>,
    /// Whether a private-network connection is attached
    pub network_attachment: bool,
}

/// A successfully created session, as seen in the creation event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionCreationEvent {
    pub session_id: SessionId,
    pub requested: RequestedConfig,
    pub principal: Option<PrincipalId>,
    pub account: Option<String>,
    pub region: Option<String>,
    pub event_time: Option<DateTime<Utc>>,
}

/// Result of parsing an inbound event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedEvent {
    Created(SessionCreationEvent),

    /// The CreateSession call failed; there is no session to enforce on
    CreationFailed {
        request_id: SessionId,
        error_code: Option<String>,
    },
}

/// Parse a raw event envelope
pub fn parse_event(raw: &serde_json::Value) -> EnforcementResult<ParsedEvent> {
    let envelope = EventEnvelope::deserialize(raw)
        .map_err(|e| EnforcementError::malformed(format!("unrecognized envelope: {}", e)))?;

    let detail = envelope
        .detail
        .as_ref()
        .ok_or_else(|| EnforcementError::malformed("missing detail"))?;

    let source = detail
        .event_source
        .as_deref()
        .or(envelope.event_source.as_deref());
    if source != Some(GLUE_EVENT_SOURCE) {
        return Err(EnforcementError::malformed(format!(
            "unexpected event source {:?}",
            source
        )));
    }

    let name = detail.event_name.as_deref().or(envelope.event_name.as_deref());
    if name != Some(CREATE_SESSION_EVENT) {
        return Err(EnforcementError::malformed(format!(
            "unexpected event name {:?}",
            name
        )));
    }

    let params = detail.request_parameters.as_ref();

    let response = match &detail.response_elements {
        Some(value) => ResponseElements::deserialize(value).map_err(|e| {
            EnforcementError::malformed(format!("unrecognized response elements: {}", e))
        })?,
        None => {
            let request_id = params
                .and_then(|p| p.id.as_deref())
                .filter(|id| !id.is_empty())
                .ok_or_else(|| {
                    EnforcementError::malformed("no response elements and no request id")
                })?;
            return Ok(ParsedEvent::CreationFailed {
                request_id: SessionId::new(request_id),
                error_code: detail.error_code.clone(),
            });
        }
    };

    let session = response.session.as_ref();
    let session_id = session
        .and_then(|s| s.id.as_deref())
        .filter(|id| !id.is_empty())
        .map(SessionId::new)
        .ok_or_else(|| EnforcementError::malformed("missing session identifier"))?;

    let workers = numeric(params.and_then(|p| p.number_of_workers.as_ref()), "numberOfWorkers")?;
    let idle_timeout = numeric(params.and_then(|p| p.idle_timeout.as_ref()), "idleTimeout")?
        .map(minutes);

    let network_attachment = session
        .and_then(|s| s.connections.as_ref())
        .is_some_and(|c| c.is_attached())
        || params
            .and_then(|p| p.connections.as_ref())
            .is_some_and(|c| c.is_attached());

    let account = envelope
        .account
        .clone()
        .or_else(|| detail.recipient_account_id.clone())
        .or_else(|| {
            detail
                .user_identity
                .as_ref()
                .and_then(|u| u.account_id.clone())
        });

    Ok(ParsedEvent::Created(SessionCreationEvent {
        session_id,
        requested: RequestedConfig {
            workers,
            idle_timeout,
            network_attachment,
        },
        principal: resolve_principal(detail, params),
        account,
        region: envelope.region.clone().or_else(|| detail.aws_region.clone()),
        event_time: envelope.time,
    }))
}

fn numeric(field: Option<&NumericField>, name: &str) -> EnforcementResult<Option<u32>> {
    field
        .map(|f| {
            f.to_u32().ok_or_else(|| {
                EnforcementError::malformed(format!("{} is not a non-negative integer: {:?}", name, f))
            })
        })
        .transpose()
}

/// Find the user behind a session.
///
/// A principal id that carries a mail address identifies the user directly
/// (federated SSO roles). Otherwise fall back to the `owner` tag.
fn resolve_principal(
    detail: &CloudTrailDetail,
    params: Option<&RequestParameters>,
) -> Option<PrincipalId> {
    let principal_id = detail
        .user_identity
        .as_ref()
        .and_then(|u| u.principal_id.as_deref());

    let raw = match principal_id {
        Some(id) if id.contains('@') => Some(id),
        _ => params.and_then(|p| p.owner_tag()),
    };

    raw.and_then(PrincipalId::normalize)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn create_session_event() -> serde_json::Value {
        json!({
            "version": "0",
            "id": "6f7a",
            "detail-type": "AWS API Call via CloudTrail",
            "source": "aws.glue",
            "account": "123456789012",
            "time": "2024-05-01T12:00:00Z",
            "region": "eu-west-1",
            "detail": {
                "eventSource": "glue.amazonaws.com",
                "eventName": "CreateSession",
                "userIdentity": {"principalId": "AROAEXAMPLE:some@principal"},
                "requestParameters": {
                    "id": "debd3e86-1432-484b-b231-7e5e22d468b8",
                    "numberOfWorkers": 2,
                    "idleTimeout": 60
                },
                "responseElements": {
                    "session": {
                        "id": "tenant-d4868e04-4a21-43c0-8fd3",
                        "connections": {"connections": ["internal"]}
                    }
                }
            }
        })
    }

    fn created(raw: &serde_json::Value) -> SessionCreationEvent {
        match parse_event(raw).unwrap() {
            ParsedEvent::Created(event) => event,
            other => panic!("expected created session, got {:?}", other),
        }
    }

    #[test]
    fn parse_full_event() {
        let event = created(&create_session_event());

        assert_eq!(event.session_id.as_str(), "tenant-d4868e04-4a21-43c0-8fd3");
        assert_eq!(event.requested.workers, Some(2));
        assert_eq!(event.requested.idle_timeout, Some(Duration::from_secs(3600)));
        assert!(event.requested.network_attachment);
        assert_eq!(event.principal.unwrap().as_str(), "some");
        assert_eq!(event.account.as_deref(), Some("123456789012"));
        assert_eq!(event.region.as_deref(), Some("eu-west-1"));
        assert!(event.event_time.is_some());
    }

    #[test]
    fn omitted_values_stay_unresolved() {
        let mut raw = create_session_event();
        let params = raw["detail"]["requestParameters"].as_object_mut().unwrap();
        params.remove("numberOfWorkers");
        params.remove("idleTimeout");
        raw["detail"]["responseElements"]["session"]
            .as_object_mut()
            .unwrap()
            .remove("connections");

        let event = created(&raw);
        assert_eq!(event.requested.workers, None);
        assert_eq!(event.requested.idle_timeout, None);
        assert!(!event.requested.network_attachment);
    }

    #[test]
    fn numeric_strings_accepted() {
        let mut raw = create_session_event();
        raw["detail"]["requestParameters"]["numberOfWorkers"] = json!("20");

        assert_eq!(created(&raw).requested.workers, Some(20));
    }

    #[test]
    fn garbage_worker_count_is_malformed() {
        let mut raw = create_session_event();
        raw["detail"]["requestParameters"]["numberOfWorkers"] = json!(-3);

        assert!(matches!(
            parse_event(&raw),
            Err(EnforcementError::MalformedEvent(_))
        ));
    }

    #[test]
    fn missing_session_id_is_malformed() {
        let mut raw = create_session_event();
        raw["detail"]["responseElements"]["session"]
            .as_object_mut()
            .unwrap()
            .remove("id");

        let err = parse_event(&raw).unwrap_err();
        assert!(matches!(err, EnforcementError::MalformedEvent(ref m) if m.contains("session identifier")));
    }

    #[test]
    fn wrong_source_or_name_is_malformed() {
        let mut raw = create_session_event();
        raw["detail"]["eventName"] = json!("DeleteSession");
        assert!(matches!(parse_event(&raw), Err(EnforcementError::MalformedEvent(_))));

        let mut raw = create_session_event();
        raw["detail"]["eventSource"] = json!("s3.amazonaws.com");
        assert!(matches!(parse_event(&raw), Err(EnforcementError::MalformedEvent(_))));
    }

    #[test]
    fn top_level_source_and_name_accepted() {
        let mut raw = create_session_event();
        let detail = raw["detail"].as_object_mut().unwrap();
        detail.remove("eventSource");
        detail.remove("eventName");
        raw["eventSource"] = json!("glue.amazonaws.com");
        raw["eventName"] = json!("CreateSession");

        assert_eq!(created(&raw).session_id.as_str(), "tenant-d4868e04-4a21-43c0-8fd3");
    }

    #[test]
    fn missing_detail_is_malformed() {
        let raw = json!({"source": "aws.glue"});
        assert!(matches!(parse_event(&raw), Err(EnforcementError::MalformedEvent(_))));
    }

    #[test]
    fn null_response_is_failed_creation() {
        let mut raw = create_session_event();
        raw["detail"]["responseElements"] = serde_json::Value::Null;
        raw["detail"]["errorCode"] = json!("ResourceNumberLimitExceededException");

        match parse_event(&raw).unwrap() {
            ParsedEvent::CreationFailed {
                request_id,
                error_code,
            } => {
                assert_eq!(request_id.as_str(), "debd3e86-1432-484b-b231-7e5e22d468b8");
                assert_eq!(
                    error_code.as_deref(),
                    Some("ResourceNumberLimitExceededException")
                );
            }
            other => panic!("expected failed creation, got {:?}", other),
        }
    }

    #[test]
    fn principal_falls_back_to_owner_tag() {
        let mut raw = create_session_event();
        raw["detail"]["userIdentity"]["principalId"] = json!("ABC");
        raw["detail"]["requestParameters"]["tags"] = json!({"owner": "abc.a@a"});

        assert_eq!(created(&raw).principal.unwrap().as_str(), "abc.a");
    }

    #[test]
    fn principal_unresolved_without_mail_or_tag() {
        let mut raw = create_session_event();
        raw["detail"]["userIdentity"]["principalId"] = json!("AROAEXAMPLE:i-0abc");

        assert!(created(&raw).principal.is_none());
    }
}
