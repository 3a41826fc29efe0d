//! Shared utilities for session-warden
//!
//! This crate provides:
//! - ID types (SessionId, PrincipalId)
//! - Duration helpers for minute-granular limits

mod ids;
mod time;

pub use ids::*;
pub use time::*;
