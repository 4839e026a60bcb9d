//! Payment processor confirmation client.
//!
//! # Responsibilities
//! - Confirm a payment intent from its opaque client secret
//! - Distinguish in-band declines from out-of-band transport errors
//! - Apply a request timeout so a stalled processor cannot hang a
//!   checkout indefinitely

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use url::Url;

use crate::config::schema::PaymentsConfig;
use crate::payments::types::{ConfirmResult, InlineFailure, ProcessorError};

/// Confirmation seam. Checkout sessions only ever see this trait, so
/// tests drive the full state machine with scripted outcomes.
#[async_trait]
pub trait PaymentProcessor: Send + Sync {
    /// Ask the processor to confirm the payment authorized by
    /// `client_secret`, supplying the return URL used for any
    /// redirect-based authentication step.
    async fn confirm_payment(
        &self,
        client_secret: &str,
        return_url: &str,
    ) -> Result<ConfirmResult, ProcessorError>;
}

#[derive(Debug, Default, Deserialize)]
struct ConfirmResponse {
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: Option<String>,
    code: Option<String>,
}

/// HTTP client for the hosted processor's confirmation API.
pub struct HostedProcessor {
    client: reqwest::Client,
    api_base: Url,
    public_key: String,
}

impl HostedProcessor {
    pub fn new(config: &PaymentsConfig) -> Result<Self, ProcessorError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        let api_base = config
            .api_base
            .parse()
            .map_err(|e| ProcessorError::Config(format!("invalid api base '{}': {}", config.api_base, e)))?;
        Ok(Self {
            client,
            api_base,
            public_key: config.public_key.clone(),
        })
    }

    /// The intent identifier is the prefix of the client secret.
    fn intent_id(client_secret: &str) -> Result<&str, ProcessorError> {
        match client_secret.split_once("_secret_") {
            Some((id, rest)) if !id.is_empty() && !rest.is_empty() => Ok(id),
            _ => Err(ProcessorError::MalformedSecret),
        }
    }
}

#[async_trait]
impl PaymentProcessor for HostedProcessor {
    async fn confirm_payment(
        &self,
        client_secret: &str,
        return_url: &str,
    ) -> Result<ConfirmResult, ProcessorError> {
        let intent_id = Self::intent_id(client_secret)?;
        let url = self
            .api_base
            .join(&format!("v1/payment_intents/{}/confirm", intent_id))
            .map_err(|e| ProcessorError::Config(e.to_string()))?;

        let body = json!({
            "client_secret": client_secret,
            "return_url": return_url,
        });

        let response = self
            .client
            .post(url)
            .bearer_auth(&self.public_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let parsed: ConfirmResponse = match response.json().await {
            Ok(parsed) => parsed,
            Err(_) if status.is_success() => ConfirmResponse::default(),
            Err(e) => return Err(ProcessorError::Transport(e)),
        };

        // A decline arrives as a client error with an error descriptor
        // in the body: in-band, not an exception.
        if let Some(error) = parsed.error {
            if status.is_client_error() {
                return Ok(ConfirmResult {
                    failure: Some(InlineFailure {
                        message: error.message.unwrap_or_else(|| "Payment failed".to_string()),
                        code: error.code,
                    }),
                });
            }
            return Err(ProcessorError::Status {
                status: status.as_u16(),
                message: error.message.unwrap_or_default(),
            });
        }

        if !status.is_success() {
            return Err(ProcessorError::Status {
                status: status.as_u16(),
                message: String::new(),
            });
        }

        Ok(ConfirmResult { failure: None })
    }
}
