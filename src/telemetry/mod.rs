//! Telemetry façade.
//!
//! # Responsibilities
//! - Own the configured sink list as an explicit, passable handle
//! - Fan each call out across sinks with per-sink failure isolation
//! - Track events, feature usage, errors, performance and sessions
//!
//! # Design Decisions
//! - No global registration: callers construct a [`Telemetry`] handle
//!   and pass it down, so tests substitute doubles and two handles are
//!   fully isolated from each other
//! - A sink failure is logged and counted, never propagated; later
//!   sinks in the list always run
//! - No retries, batching or local buffering: one direct call per sink

pub mod event;
pub mod session;
pub mod sink;

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde_json::Value;

use crate::config::schema::TelemetryConfig;
use crate::observability::metrics;

pub use event::{
    ClientInfo, ErrorReport, MonitoringEvent, PerformanceMetric, PerformanceReport, SessionRecord,
};
pub use session::SessionHandle;
pub use sink::{ErrorVaultSink, FunnelSink, InsightSink, SinkError, TelemetrySink};

/// Handle over the configured telemetry sinks. Cheap to clone.
#[derive(Clone)]
pub struct Telemetry {
    sinks: Arc<Vec<Arc<dyn TelemetrySink>>>,
}

impl Telemetry {
    /// Build the sink list from configuration. Sinks with no key or
    /// endpoint configured are skipped with a warning rather than
    /// failing startup, so a partially configured environment still
    /// delivers to the backends it can reach.
    pub fn from_config(config: &TelemetryConfig) -> Result<Self, SinkError> {
        let timeout = Duration::from_secs(config.timeout_secs);
        let mut sinks: Vec<Arc<dyn TelemetrySink>> = Vec::new();

        if config.error_vault.endpoint.is_empty() {
            tracing::warn!("error vault endpoint not configured, sink disabled");
        } else {
            sinks.push(Arc::new(ErrorVaultSink::new(&config.error_vault, timeout)?));
        }

        if config.funnel.token.is_empty() {
            tracing::warn!("funnel analytics token not configured, sink disabled");
        } else {
            sinks.push(Arc::new(FunnelSink::new(&config.funnel, timeout)?));
        }

        if config.insight.api_key.is_empty() {
            tracing::warn!("product analytics key not configured, sink disabled");
        } else {
            sinks.push(Arc::new(InsightSink::new(&config.insight, timeout)?));
        }

        tracing::info!(sinks = sinks.len(), "telemetry initialized");
        Ok(Self::with_sinks(sinks))
    }

    /// Build a handle over an explicit sink list.
    pub fn with_sinks(sinks: Vec<Arc<dyn TelemetrySink>>) -> Self {
        Self {
            sinks: Arc::new(sinks),
        }
    }

    /// A handle that delivers nowhere.
    pub fn disabled() -> Self {
        Self::with_sinks(Vec::new())
    }

    /// Deliver a named event to the analytics sinks. The error vault
    /// never receives plain events.
    pub async fn track_event(&self, name: &str, properties: Value) {
        let event = MonitoringEvent::new(name, properties);
        self.deliver(&event).await;
    }

    /// Deliver a `Feature_<name>` event carrying the feature name and
    /// caller metadata.
    pub async fn track_feature_usage(&self, feature: &str, metadata: Value) {
        let mut properties = event::into_object(metadata);
        properties.insert("feature".to_string(), Value::String(feature.to_string()));
        let event = MonitoringEvent::new(format!("Feature_{}", feature), Value::Object(properties));
        self.deliver(&event).await;
    }

    /// Forward an error to every sink, the error vault included.
    /// Never fails the caller's flow: each sink's outcome is observed
    /// independently and swallowed.
    pub async fn track_error(&self, report: &ErrorReport) {
        for sink in self.sinks.iter() {
            if let Err(e) = sink.capture_error(report).await {
                self.delivery_failed(sink.name(), &e);
            }
        }
    }

    /// Forward each present performance signal to every sink under its
    /// per-metric name.
    pub async fn record_performance(&self, report: &PerformanceReport) {
        for metric in report.metrics() {
            for sink in self.sinks.iter() {
                if let Err(e) = sink.record_metric(&metric).await {
                    self.delivery_failed(sink.name(), &e);
                }
            }
        }
    }

    /// Identify the user to every sink.
    pub async fn identify(&self, user_id: &str) {
        for sink in self.sinks.iter() {
            if let Err(e) = sink.identify(user_id).await {
                self.delivery_failed(sink.name(), &e);
            }
        }
    }

    /// Identify the user everywhere, emit the session start record and
    /// return a handle that emits the correlated end record.
    pub async fn start_session(&self, user_id: &str, client: ClientInfo) -> SessionHandle {
        self.identify(user_id).await;
        let record = SessionRecord::begin(user_id, client);
        let event = MonitoringEvent::new("Session_Start", Value::Object(record.properties()));
        self.deliver(&event).await;
        SessionHandle::new(self.clone(), record)
    }

    /// Emit the session end record with a duration computed from the
    /// start time.
    pub async fn end_session(&self, record: SessionRecord) {
        let end_time = Utc::now();
        let duration_ms = (end_time - record.start_time).num_milliseconds();
        let mut properties = record.properties();
        properties.insert("end_time".to_string(), Value::String(end_time.to_rfc3339()));
        properties.insert("duration".to_string(), Value::from(duration_ms));
        let event = MonitoringEvent::new("Session_End", Value::Object(properties));
        self.deliver(&event).await;
    }

    async fn deliver(&self, event: &MonitoringEvent) {
        for sink in self.sinks.iter().filter(|sink| sink.accepts_events()) {
            if let Err(e) = sink.track(event).await {
                self.delivery_failed(sink.name(), &e);
            }
        }
    }

    fn delivery_failed(&self, sink: &'static str, error: &SinkError) {
        metrics::record_sink_failure(sink);
        tracing::warn!(sink, error = %error, "telemetry delivery failed");
    }
}
