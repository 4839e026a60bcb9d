//! Telemetry sinks.
//!
//! Each sink is a plain HTTP ingestion client for one external
//! backend. The façade fans every call out across its sink list and
//! isolates failures per sink, so these clients only report their own
//! outcome and never see each other.

use std::sync::{Mutex, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{json, Value};
use thiserror::Error;
use url::Url;

use crate::config::schema::{ErrorVaultConfig, FunnelConfig, InsightConfig};
use crate::telemetry::event::{ErrorReport, MonitoringEvent, PerformanceMetric};

/// Maximum breadcrumbs buffered by the error vault between captures.
const MAX_BREADCRUMBS: usize = 100;

/// Errors from a single sink delivery.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("ingestion endpoint returned status {0}")]
    Status(u16),

    #[error("invalid sink configuration: {0}")]
    Config(String),
}

/// One external telemetry backend.
///
/// `accepts_events` controls whether plain product events reach the
/// sink; the error vault opts out so feature and event tracking never
/// hit it, while errors, identification and performance metrics fan
/// out to every sink.
#[async_trait]
pub trait TelemetrySink: Send + Sync {
    fn name(&self) -> &'static str;

    fn accepts_events(&self) -> bool {
        true
    }

    async fn track(&self, event: &MonitoringEvent) -> Result<(), SinkError>;

    async fn identify(&self, user_id: &str) -> Result<(), SinkError>;

    async fn capture_error(&self, report: &ErrorReport) -> Result<(), SinkError>;

    async fn record_metric(&self, metric: &PerformanceMetric) -> Result<(), SinkError>;
}

fn join_path(base: &str, path: &str) -> Result<Url, SinkError> {
    format!("{}/{}", base.trim_end_matches('/'), path)
        .parse()
        .map_err(|e| SinkError::Config(format!("invalid endpoint '{}': {}", base, e)))
}

fn check_status(response: &reqwest::Response) -> Result<(), SinkError> {
    let status = response.status();
    if status.is_success() {
        Ok(())
    } else {
        Err(SinkError::Status(status.as_u16()))
    }
}

/// Funnel analytics sink: batchless event ingestion authenticated by a
/// write token carried inside each event's properties.
pub struct FunnelSink {
    client: reqwest::Client,
    track_url: Url,
    engage_url: Url,
    token: String,
}

impl FunnelSink {
    pub fn new(config: &FunnelConfig, timeout: Duration) -> Result<Self, SinkError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            track_url: join_path(&config.endpoint, "track")?,
            engage_url: join_path(&config.endpoint, "engage")?,
            token: config.token.clone(),
        })
    }
}

#[async_trait]
impl TelemetrySink for FunnelSink {
    fn name(&self) -> &'static str {
        "funnel"
    }

    async fn track(&self, event: &MonitoringEvent) -> Result<(), SinkError> {
        let mut properties = event.properties.clone();
        properties.insert("token".to_string(), Value::String(self.token.clone()));
        properties.insert(
            "time".to_string(),
            Value::from(event.timestamp.timestamp_millis()),
        );
        let body = json!({
            "event": event.name,
            "properties": Value::Object(properties),
        });
        let response = self.client.post(self.track_url.clone()).json(&body).send().await?;
        check_status(&response)
    }

    async fn identify(&self, user_id: &str) -> Result<(), SinkError> {
        let body = json!({
            "$token": self.token,
            "$distinct_id": user_id,
            "$set": {},
        });
        let response = self.client.post(self.engage_url.clone()).json(&body).send().await?;
        check_status(&response)
    }

    async fn capture_error(&self, report: &ErrorReport) -> Result<(), SinkError> {
        let mut properties = report.context.clone();
        properties.insert("error".to_string(), Value::String(report.message.clone()));
        if let Some(stack) = &report.stack {
            properties.insert("stack".to_string(), Value::String(stack.clone()));
        }
        self.track(&MonitoringEvent::new("Error", Value::Object(properties)))
            .await
    }

    async fn record_metric(&self, metric: &PerformanceMetric) -> Result<(), SinkError> {
        let event = MonitoringEvent::new(
            format!("Performance_{}", metric.name),
            json!({ "value": metric.value }),
        );
        self.track(&event).await
    }
}

/// Product analytics sink. The backend expects lowercase event names
/// and an `api_key` inside each capture payload.
pub struct InsightSink {
    client: reqwest::Client,
    capture_url: Url,
    api_key: String,
}

impl InsightSink {
    pub fn new(config: &InsightConfig, timeout: Duration) -> Result<Self, SinkError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            capture_url: join_path(&config.host, "capture/")?,
            api_key: config.api_key.clone(),
        })
    }

    async fn capture(
        &self,
        event: &str,
        distinct_id: &str,
        properties: Value,
        timestamp: DateTime<Utc>,
    ) -> Result<(), SinkError> {
        let body = json!({
            "api_key": self.api_key,
            "event": event,
            "distinct_id": distinct_id,
            "properties": properties,
            "timestamp": timestamp.to_rfc3339(),
        });
        let response = self.client.post(self.capture_url.clone()).json(&body).send().await?;
        check_status(&response)
    }
}

#[async_trait]
impl TelemetrySink for InsightSink {
    fn name(&self) -> &'static str {
        "insight"
    }

    async fn track(&self, event: &MonitoringEvent) -> Result<(), SinkError> {
        let distinct_id = event
            .properties
            .get("user_id")
            .and_then(Value::as_str)
            .unwrap_or("server")
            .to_string();
        self.capture(
            &event.name.to_lowercase(),
            &distinct_id,
            Value::Object(event.properties.clone()),
            event.timestamp,
        )
        .await
    }

    async fn identify(&self, user_id: &str) -> Result<(), SinkError> {
        self.capture("$identify", user_id, json!({}), Utc::now()).await
    }

    async fn capture_error(&self, report: &ErrorReport) -> Result<(), SinkError> {
        let mut properties = report.context.clone();
        properties.insert(
            "error_message".to_string(),
            Value::String(report.message.clone()),
        );
        if let Some(stack) = &report.stack {
            properties.insert("error_stack".to_string(), Value::String(stack.clone()));
        }
        self.capture("error", "server", Value::Object(properties), Utc::now())
            .await
    }

    async fn record_metric(&self, metric: &PerformanceMetric) -> Result<(), SinkError> {
        self.capture(
            &format!("performance_{}", metric.name.to_lowercase()),
            "server",
            json!({ "value": metric.value }),
            Utc::now(),
        )
        .await
    }
}

#[derive(Debug, Clone, Serialize)]
struct Breadcrumb {
    category: &'static str,
    message: String,
    level: &'static str,
    timestamp: DateTime<Utc>,
}

/// Error-tracking sink. Performance metrics become breadcrumbs that
/// ride along with the next captured error, and the identified user is
/// attached to every capture; neither triggers a request on its own.
pub struct ErrorVaultSink {
    client: reqwest::Client,
    store_url: Url,
    user: RwLock<Option<String>>,
    breadcrumbs: Mutex<Vec<Breadcrumb>>,
}

impl ErrorVaultSink {
    pub fn new(config: &ErrorVaultConfig, timeout: Duration) -> Result<Self, SinkError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        let store_url = config
            .endpoint
            .parse()
            .map_err(|e| SinkError::Config(format!("invalid endpoint '{}': {}", config.endpoint, e)))?;
        Ok(Self {
            client,
            store_url,
            user: RwLock::new(None),
            breadcrumbs: Mutex::new(Vec::new()),
        })
    }

    fn current_user(&self) -> Option<String> {
        self.user.read().ok().and_then(|user| user.clone())
    }

    fn drain_breadcrumbs(&self) -> Vec<Breadcrumb> {
        self.breadcrumbs
            .lock()
            .map(|mut crumbs| std::mem::take(&mut *crumbs))
            .unwrap_or_default()
    }
}

#[async_trait]
impl TelemetrySink for ErrorVaultSink {
    fn name(&self) -> &'static str {
        "error_vault"
    }

    fn accepts_events(&self) -> bool {
        false
    }

    async fn track(&self, _event: &MonitoringEvent) -> Result<(), SinkError> {
        Ok(())
    }

    async fn identify(&self, user_id: &str) -> Result<(), SinkError> {
        if let Ok(mut user) = self.user.write() {
            *user = Some(user_id.to_string());
        }
        Ok(())
    }

    async fn capture_error(&self, report: &ErrorReport) -> Result<(), SinkError> {
        let user = self
            .current_user()
            .map(|id| json!({ "id": id }))
            .unwrap_or(Value::Null);
        let body = json!({
            "level": "error",
            "message": report.message,
            "stacktrace": report.stack,
            "extra": Value::Object(report.context.clone()),
            "user": user,
            "breadcrumbs": self.drain_breadcrumbs(),
            "timestamp": Utc::now().to_rfc3339(),
        });
        let response = self.client.post(self.store_url.clone()).json(&body).send().await?;
        check_status(&response)
    }

    async fn record_metric(&self, metric: &PerformanceMetric) -> Result<(), SinkError> {
        if let Ok(mut crumbs) = self.breadcrumbs.lock() {
            if crumbs.len() >= MAX_BREADCRUMBS {
                crumbs.remove(0);
            }
            crumbs.push(Breadcrumb {
                category: "performance",
                message: format!("{}: {}", metric.name, metric.value),
                level: "info",
                timestamp: Utc::now(),
            });
        }
        Ok(())
    }
}
