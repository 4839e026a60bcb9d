//! Enterprise inquiry notification.
//!
//! Best-effort by contract: the send's outcome is observed, logged and
//! counted, but never propagated to the submission flow. A failed
//! notification does not fail a submission whose directory write
//! already succeeded, and there is no retry.

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use url::Url;

use crate::config::schema::NotifyConfig;
use crate::contact::types::ContactSubmission;
use crate::observability::metrics;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("invalid notify configuration: {0}")]
    Config(String),
}

#[derive(Debug, Serialize)]
struct NotificationPayload<'a> {
    to: &'a str,
    subject: String,
    name: &'a str,
    email: &'a str,
    company: &'a str,
    message: &'a str,
}

/// Seam for the notification send, so the flow is testable without a
/// network.
#[async_trait]
pub trait NotificationSender: Send + Sync {
    async fn send(&self, submission: &ContactSubmission);
}

/// HTTP notifier posting the full submission to a fixed internal
/// endpoint with a fixed recipient.
pub struct HttpNotifier {
    client: reqwest::Client,
    endpoint: Url,
    recipient: String,
}

impl HttpNotifier {
    pub fn new(config: &NotifyConfig) -> Result<Self, NotifyError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        let endpoint = config
            .endpoint
            .parse()
            .map_err(|e| NotifyError::Config(format!("invalid endpoint '{}': {}", config.endpoint, e)))?;
        Ok(Self {
            client,
            endpoint,
            recipient: config.recipient.clone(),
        })
    }
}

#[async_trait]
impl NotificationSender for HttpNotifier {
    async fn send(&self, submission: &ContactSubmission) {
        let payload = NotificationPayload {
            to: &self.recipient,
            subject: format!("New Enterprise Inquiry from {}", submission.company),
            name: &submission.name,
            email: &submission.email,
            company: &submission.company,
            message: &submission.message,
        };

        match self.client.post(self.endpoint.clone()).json(&payload).send().await {
            Ok(response) if response.status().is_success() => {
                metrics::record_notification("sent");
                tracing::debug!(company = %submission.company, "inquiry notification sent");
            }
            Ok(response) => {
                metrics::record_notification("rejected");
                tracing::warn!(
                    status = response.status().as_u16(),
                    "inquiry notification rejected"
                );
            }
            Err(e) => {
                metrics::record_notification("failed");
                tracing::warn!(error = %e, "inquiry notification failed");
            }
        }
    }
}
