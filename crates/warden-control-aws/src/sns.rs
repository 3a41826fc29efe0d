//! SNS notifier

use async_trait::async_trait;
use aws_sdk_sns::error::DisplayErrorContext;
use tracing::debug;
use warden_control_api::{ControlError, ControlResult, Notifier};

/// SNS subjects are capped at 100 characters
const MAX_SUBJECT_LEN: usize = 100;

/// Notifier publishing to SNS topics
pub struct SnsNotifier {
    client: aws_sdk_sns::Client,
}

impl SnsNotifier {
    pub fn new(config: &aws_config::SdkConfig) -> Self {
        Self {
            client: aws_sdk_sns::Client::new(config),
        }
    }

    pub fn from_client(client: aws_sdk_sns::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Notifier for SnsNotifier {
    async fn publish(&self, topic: &str, subject: &str, body: &str) -> ControlResult<()> {
        let output = self
            .client
            .publish()
            .topic_arn(topic)
            .subject(sanitize_subject(subject))
            .message(body)
            .send()
            .await
            .map_err(|e| ControlError::service("Publish", DisplayErrorContext(&e).to_string()))?;

        debug!(
            topic = %topic,
            message_id = output.message_id().unwrap_or_default(),
            "Notification published"
        );
        Ok(())
    }
}

/// Subjects must be a single line of printable ASCII, at most 100 characters
pub fn sanitize_subject(subject: &str) -> String {
    subject
        .chars()
        .map(|c| if c.is_ascii() && !c.is_ascii_control() { c } else { ' ' })
        .take(MAX_SUBJECT_LEN)
        .collect()
}
