//! AWS adapters for session-warden
//!
//! Implements the capability traits from `warden-control-api` on top of the
//! AWS SDK: Glue for session status and termination, SNS for notifications.
//! Credentials and region come from the standard provider chain (the Lambda
//! execution role in production).

mod glue;
mod sns;

pub use glue::*;
pub use sns::*;

use aws_config::BehaviorVersion;

/// Load shared SDK configuration from the environment
pub async fn load_sdk_config() -> aws_config::SdkConfig {
    aws_config::defaults(BehaviorVersion::latest()).load().await
}
