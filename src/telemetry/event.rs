//! Telemetry event and report types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A named event delivered to the analytics sinks.
///
/// Constructed ad hoc at each call site and handed to every configured
/// sink; nothing is retained locally after delivery.
#[derive(Debug, Clone, Serialize)]
pub struct MonitoringEvent {
    pub name: String,
    pub properties: Map<String, Value>,
    pub timestamp: DateTime<Utc>,
}

impl MonitoringEvent {
    /// Build an event from a JSON value. Anything other than an object
    /// is wrapped under a `value` key so callers can pass scalars.
    pub fn new(name: impl Into<String>, properties: Value) -> Self {
        Self {
            name: name.into(),
            properties: into_object(properties),
            timestamp: Utc::now(),
        }
    }
}

pub(crate) fn into_object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        Value::Null => Map::new(),
        other => {
            let mut map = Map::new();
            map.insert("value".to_string(), other);
            map
        }
    }
}

/// An error forwarded to all sinks, error vault included.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorReport {
    pub message: String,
    #[serde(default)]
    pub stack: Option<String>,
    #[serde(default)]
    pub context: Map<String, Value>,
}

impl ErrorReport {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            stack: None,
            context: Map::new(),
        }
    }

    pub fn with_context(mut self, context: Value) -> Self {
        self.context = into_object(context);
        self
    }
}

/// Web-performance signals reported by the page, one scalar each.
///
/// TTFB is read synchronously from navigation timing by the reporter;
/// the paint and input signals arrive whenever their observers fire, so
/// every field is optional and absent fields are simply not forwarded.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PerformanceReport {
    pub ttfb: Option<f64>,
    pub fcp: Option<f64>,
    pub lcp: Option<f64>,
    pub cls: Option<f64>,
    pub fid: Option<f64>,
}

/// A single named performance scalar.
#[derive(Debug, Clone, Copy)]
pub struct PerformanceMetric {
    pub name: &'static str,
    pub value: f64,
}

impl PerformanceReport {
    /// The metrics present in this report, in reporting order.
    pub fn metrics(&self) -> Vec<PerformanceMetric> {
        [
            ("TTFB", self.ttfb),
            ("FCP", self.fcp),
            ("LCP", self.lcp),
            ("CLS", self.cls),
            ("FID", self.fid),
        ]
        .into_iter()
        .filter_map(|(name, value)| value.map(|value| PerformanceMetric { name, value }))
        .collect()
    }
}

/// Client environment captured when a session starts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientInfo {
    pub user_agent: String,
    pub screen_resolution: String,
    pub locale: String,
}

/// One identified user session. The session id is derived from the
/// start time; the end record is correlated by carrying the same id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRecord {
    pub user_id: String,
    pub session_id: String,
    pub start_time: DateTime<Utc>,
    pub user_agent: String,
    pub screen_resolution: String,
    pub locale: String,
}

impl SessionRecord {
    pub fn begin(user_id: impl Into<String>, client: ClientInfo) -> Self {
        let start_time = Utc::now();
        Self {
            user_id: user_id.into(),
            session_id: start_time.timestamp_millis().to_string(),
            start_time,
            user_agent: client.user_agent,
            screen_resolution: client.screen_resolution,
            locale: client.locale,
        }
    }

    /// Session fields as event properties.
    pub fn properties(&self) -> Map<String, Value> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn event_coerces_non_object_properties() {
        let event = MonitoringEvent::new("x", json!(42));
        assert_eq!(event.properties.get("value"), Some(&json!(42)));

        let event = MonitoringEvent::new("x", Value::Null);
        assert!(event.properties.is_empty());
    }

    #[test]
    fn report_skips_absent_metrics() {
        let report = PerformanceReport {
            fcp: Some(812.0),
            cls: Some(0.02),
            ..Default::default()
        };
        let metrics = report.metrics();
        assert_eq!(metrics.len(), 2);
        assert_eq!(metrics[0].name, "FCP");
        assert_eq!(metrics[1].name, "CLS");
    }

    #[test]
    fn session_id_derived_from_start_time() {
        let record = SessionRecord::begin(
            "u-1",
            ClientInfo {
                user_agent: "test-agent".into(),
                screen_resolution: "1920x1080".into(),
                locale: "en-AU".into(),
            },
        );
        assert_eq!(
            record.session_id,
            record.start_time.timestamp_millis().to_string()
        );
        let props = record.properties();
        assert_eq!(props.get("user_id"), Some(&json!("u-1")));
        assert_eq!(props.get("locale"), Some(&json!("en-AU")));
    }
}
