//! Core policy evaluation and enforcement for session-warden
//!
//! This crate is the heart of session-warden, containing:
//! - Event parsing (CloudTrail CreateSession record -> SessionCreationEvent)
//! - Policy evaluation (which limits a session breaches)
//! - Waiting for a provisioning session to become terminable
//! - Enforcement (terminate and/or notify, failures aggregated)

mod enforcer;
mod error;
mod evaluator;
mod executor;
mod notice;
mod parser;
mod waiter;

pub use enforcer::*;
pub use error::*;
pub use evaluator::*;
pub use executor::*;
pub use notice::*;
pub use parser::*;
pub use waiter::*;
