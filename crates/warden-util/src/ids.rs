//! Strongly-typed identifiers for session-warden

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of an interactive session, as assigned by the owning service
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for SessionId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for SessionId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// The human principal a session is attributed to
///
/// Always normalized: no account/role prefix and no mail domain.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PrincipalId(String);

impl PrincipalId {
    /// Normalize a raw principal such as `AROAXXX:jane.doe@example.com`
    /// down to `jane.doe`. Returns `None` when nothing usable remains.
    pub fn normalize(raw: &str) -> Option<Self> {
        let tail = raw.rsplit(':').next().unwrap_or(raw);
        let user = tail.split('@').next().unwrap_or(tail).trim();
        if user.is_empty() {
            None
        } else {
            Some(Self(user.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PrincipalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
