//! Contact directory client.
//!
//! Insert-only writes of one record per submission to a hosted table
//! behind a REST interface. Success and failure are communicated by
//! HTTP status; there is nothing to clean up on failure because the
//! insert is the first and only write in the flow.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use url::Url;

use crate::config::schema::DirectoryConfig;
use crate::contact::types::ContactRecord;

/// Errors from a directory insert.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("directory rejected insert with status {status}: {message}")]
    Rejected { status: u16, message: String },

    #[error("invalid directory configuration: {0}")]
    Config(String),
}

/// Write side of the contact directory.
#[async_trait]
pub trait ContactStore: Send + Sync {
    async fn insert(&self, record: &ContactRecord) -> Result<(), StoreError>;
}

/// REST-backed directory. The hosted table service accepts an array of
/// rows per request and authenticates with an API key header.
pub struct RestDirectory {
    client: reqwest::Client,
    insert_url: Url,
    api_key: String,
}

impl RestDirectory {
    pub fn new(config: &DirectoryConfig) -> Result<Self, StoreError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        let insert_url = format!(
            "{}/rest/v1/{}",
            config.base_url.trim_end_matches('/'),
            config.table
        )
        .parse()
        .map_err(|e| StoreError::Config(format!("invalid base url '{}': {}", config.base_url, e)))?;
        Ok(Self {
            client,
            insert_url,
            api_key: config.api_key.clone(),
        })
    }
}

#[async_trait]
impl ContactStore for RestDirectory {
    async fn insert(&self, record: &ContactRecord) -> Result<(), StoreError> {
        let response = self
            .client
            .post(self.insert_url.clone())
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .json(&[record])
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            tracing::debug!(table = %self.insert_url, "contact record inserted");
            Ok(())
        } else {
            let message = response.text().await.unwrap_or_default();
            Err(StoreError::Rejected {
                status: status.as_u16(),
                message,
            })
        }
    }
}
