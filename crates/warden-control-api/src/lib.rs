//! Capability traits for session-warden
//!
//! This crate defines the interface between the enforcement core and the
//! services it acts on. It contains no cloud code itself; the AWS-backed
//! implementations live in `warden-control-aws`, and recording mocks for
//! tests live here.

mod mock;
mod traits;

pub use mock::*;
pub use traits::*;
