//! Violation notices

use std::fmt::Write;
use warden_api::ViolationResult;

use crate::SessionCreationEvent;

pub const SUBJECT_CLOSED: &str = "Glue Interactive Session Closed";
pub const SUBJECT_VIOLATION: &str = "Glue Interactive Session Policy Violation";

/// Human-readable notice about a policy violation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViolationNotice {
    pub subject: String,
    pub body: String,
}

impl ViolationNotice {
    pub fn new(
        event: &SessionCreationEvent,
        violations: &ViolationResult,
        terminated: bool,
    ) -> Self {
        let subject = if terminated {
            SUBJECT_CLOSED
        } else {
            SUBJECT_VIOLATION
        };

        let mut body = String::new();
        let _ = writeln!(body, "Session: {}", event.session_id);
        let _ = writeln!(
            body,
            "User: {}",
            event
                .principal
                .as_ref()
                .map(|p| p.as_str())
                .unwrap_or("unknown")
        );
        let _ = writeln!(body, "Account: {}", event.account.as_deref().unwrap_or("unknown"));
        if let Some(region) = &event.region {
            let _ = writeln!(body, "Region: {}", region);
        }
        let _ = writeln!(body);
        let _ = writeln!(body, "Violations:");
        for rule in violations.rules() {
            let _ = writeln!(body, "  {}", rule);
        }
        let _ = writeln!(body);
        let _ = write!(body, "Terminated: {}", if terminated { "yes" } else { "no" });

        Self {
            subject: subject.to_string(),
            body,
        }
    }
}
