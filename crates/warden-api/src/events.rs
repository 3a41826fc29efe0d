//! Inbound event envelope
//!
//! Session creation is observed through CloudTrail records delivered by
//! EventBridge. Only the fields the enforcer reads are modelled; everything
//! else is ignored during deserialization.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// `eventSource` of the owning service
pub const GLUE_EVENT_SOURCE: &str = "glue.amazonaws.com";

/// `eventName` of the session-creation call
pub const CREATE_SESSION_EVENT: &str = "CreateSession";

/// EventBridge envelope
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct EventEnvelope {
    pub id: Option<String>,
    pub source: Option<String>,
    pub detail_type: Option<String>,
    pub account: Option<String>,
    pub region: Option<String>,
    pub time: Option<DateTime<Utc>>,

    /// Some routers flatten the CloudTrail fields onto the envelope
    #[serde(rename = "eventSource")]
    pub event_source: Option<String>,

    #[serde(rename = "eventName")]
    pub event_name: Option<String>,

    pub detail: Option<CloudTrailDetail>,
}

/// CloudTrail record carried in `detail`
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CloudTrailDetail {
    pub event_source: Option<String>,
    pub event_name: Option<String>,
    pub aws_region: Option<String>,
    pub recipient_account_id: Option<String>,
    pub error_code: Option<String>,
    pub error_message: Option<String>,
    pub user_identity: Option<UserIdentity>,
    pub request_parameters: Option<RequestParameters>,

    /// Null when the API call failed. Kept untyped so a null can be told
    /// apart from a shape mismatch.
    pub response_elements: Option<serde_json::Value>,
}

/// Caller identity
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserIdentity {
    #[serde(rename = "type")]
    pub identity_type: Option<String>,
    pub principal_id: Option<String>,
    pub arn: Option<String>,
    pub account_id: Option<String>,
}

/// CreateSession request parameters
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestParameters {
    pub id: Option<String>,
    pub number_of_workers: Option<NumericField>,

    /// Minutes
    pub idle_timeout: Option<NumericField>,
    pub worker_type: Option<String>,
    pub connections: Option<ConnectionsList>,

    #[serde(default)]
    pub tags: HashMap<String, serde_json::Value>,
}

impl RequestParameters {
    /// The `owner` tag, if present and a string
    pub fn owner_tag(&self) -> Option<&str> {
        self.tags.get("owner").and_then(|v| v.as_str())
    }
}

/// CreateSession response elements
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ResponseElements {
    pub session: Option<SessionDescriptor>,
}

/// Session as echoed back in the response
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionDescriptor {
    pub id: Option<String>,
    pub status: Option<String>,
    pub connections: Option<ConnectionsList>,
}

/// Network connections attached to a session
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ConnectionsList {
    pub connections: Option<Vec<String>>,
}

impl ConnectionsList {
    pub fn is_attached(&self) -> bool {
        self.connections.as_ref().is_some_and(|c| !c.is_empty())
    }
}

/// A number that CloudTrail may render as a JSON number or as a string
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum NumericField {
    Int(i64),
    Float(f64),
    Text(String),
}

impl NumericField {
    /// Interpret as a non-negative whole number
    pub fn to_u32(&self) -> Option<u32> {
        match self {
            NumericField::Int(n) => u32::try_from(*n).ok(),
            NumericField::Float(f) => {
                if f.fract() == 0.0 && *f >= 0.0 && *f <= f64::from(u32::MAX) {
                    Some(*f as u32)
                } else {
                    None
                }
            }
            NumericField::Text(s) => s.trim().parse().ok(),
        }
    }
}
