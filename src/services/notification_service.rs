use std::{fmt, sync::Arc};

use async_trait::async_trait;
use aws_sdk_sns::{Client as SnsClient, error::DisplayErrorContext};
use tokio::sync::Mutex;

use crate::{
    config::{self, AppConfig},
    models::InventoryItem,
};

pub const LOW_STOCK_SUBJECT: &str = "Low Stock Alert";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotifyError(pub String);

impl fmt::Display for NotifyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for NotifyError {}

/// Out-of-band delivery of a subject/message pair to subscribers.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn publish(&self, subject: &str, message: &str) -> Result<(), NotifyError>;
}

pub fn low_stock_message(item: &InventoryItem) -> String {
    format!(
        "⚠️ LOW STOCK ALERT:\nItem: {}\nQuantity: {}",
        item.name.as_deref().unwrap_or("None"),
        item.quantity
    )
}

pub struct SnsNotifier {
    client: SnsClient,
    topic_arn: String,
}

impl SnsNotifier {
    pub fn new(client: SnsClient, topic_arn: impl Into<String>) -> Self {
        Self {
            client,
            topic_arn: topic_arn.into(),
        }
    }
}

#[async_trait]
impl NotificationSink for SnsNotifier {
    async fn publish(&self, subject: &str, message: &str) -> Result<(), NotifyError> {
        self.client
            .publish()
            .topic_arn(&self.topic_arn)
            .subject(subject)
            .message(message)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to publish to SNS: {}", DisplayErrorContext(&e));
                NotifyError(format!("{}", DisplayErrorContext(&e)))
            })?;

        Ok(())
    }
}

/// Builds the SNS notifier when a topic is configured.
pub async fn load_notifier(app_config: &AppConfig) -> Option<Arc<dyn NotificationSink>> {
    let Some(topic_arn) = app_config.notifications.topic_arn.clone() else {
        tracing::info!("SNS_TOPIC_ARN not set, low-stock notifications disabled");
        return None;
    };

    let sdk_config = config::load_sdk_config(&app_config.aws).await;
    let client = SnsClient::new(&sdk_config);

    tracing::info!("AWS SNS client initialized for topic {}", topic_arn);

    Some(Arc::new(SnsNotifier::new(client, topic_arn)))
}

/// A notification captured by [`RecordingNotifier`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentNotification {
    pub subject: String,
    pub message: String,
}

/// In-memory sink that keeps everything published to it.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<SentNotification>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn sent(&self) -> Vec<SentNotification> {
        self.sent.lock().await.clone()
    }
}

#[async_trait]
impl NotificationSink for RecordingNotifier {
    async fn publish(&self, subject: &str, message: &str) -> Result<(), NotifyError> {
        self.sent.lock().await.push(SentNotification {
            subject: subject.to_string(),
            message: message.to_string(),
        });
        Ok(())
    }
}
