//! Wire and domain types for session-warden
//!
//! This crate defines the types shared between the enforcer and its callers:
//! - The inbound EventBridge/CloudTrail envelope for session creation
//! - Session status as observed from the owning service
//! - Violation results and enforcement outcomes

mod events;
mod types;

pub use events::*;
pub use types::*;
