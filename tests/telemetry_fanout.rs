//! End-to-end tests for the telemetry ingestion surface and its
//! fan-out across the configured sinks.

use serde_json::json;

mod common;
use common::{base_config, start_gateway, start_mock_backend, MockBackend};

struct Sinks {
    vault: MockBackend,
    funnel: MockBackend,
    insight: MockBackend,
}

async fn gateway_with_all_sinks() -> (std::net::SocketAddr, Sinks) {
    let vault = start_mock_backend(200, "{}").await;
    let funnel = start_mock_backend(200, "1").await;
    let insight = start_mock_backend(200, r#"{"status":1}"#).await;

    let mut config = base_config();
    config.telemetry.error_vault.endpoint = format!("{}/api/store", vault.url());
    config.telemetry.funnel.token = "token-1".to_string();
    config.telemetry.funnel.endpoint = funnel.url();
    config.telemetry.insight.api_key = "phk-1".to_string();
    config.telemetry.insight.host = insight.url();

    let addr = start_gateway(config).await;
    (addr, Sinks { vault, funnel, insight })
}

#[tokio::test]
async fn event_reaches_both_analytics_backends_but_not_the_vault() {
    let (addr, sinks) = gateway_with_all_sinks().await;

    let response = reqwest::Client::new()
        .post(format!("http://{}/api/telemetry/event", addr))
        .json(&json!({ "name": "x", "properties": { "a": 1 } }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 202);

    let tracked = sinks.funnel.requests_to("/track");
    assert_eq!(tracked.len(), 1);
    assert!(tracked[0].body.contains("\"a\":1"));
    assert!(tracked[0].body.contains("\"time\":"));

    let captured = sinks.insight.requests_to("/capture/");
    assert_eq!(captured.len(), 1);
    assert!(captured[0].body.contains("\"a\":1"));
    assert!(captured[0].body.contains("\"timestamp\":"));

    assert!(sinks.vault.requests().is_empty());
}

#[tokio::test]
async fn feature_usage_is_delivered_under_its_feature_name() {
    let (addr, sinks) = gateway_with_all_sinks().await;

    reqwest::Client::new()
        .post(format!("http://{}/api/telemetry/feature", addr))
        .json(&json!({ "feature": "Export", "metadata": { "format": "csv" } }))
        .send()
        .await
        .unwrap();

    let tracked = sinks.funnel.requests_to("/track");
    assert!(tracked[0].body.contains("Feature_Export"));
    assert!(tracked[0].body.contains("csv"));

    // The product analytics backend receives lowercase names.
    let captured = sinks.insight.requests_to("/capture/");
    assert!(captured[0].body.contains("feature_export"));
}

#[tokio::test]
async fn errors_fan_out_to_all_three_backends() {
    let (addr, sinks) = gateway_with_all_sinks().await;

    let response = reqwest::Client::new()
        .post(format!("http://{}/api/telemetry/error", addr))
        .json(&json!({
            "message": "boom",
            "stack": "at main.rs:1",
            "context": { "step": "insert" },
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 202);

    let stored = sinks.vault.requests_to("/api/store");
    assert_eq!(stored.len(), 1);
    assert!(stored[0].body.contains("boom"));

    let tracked = sinks.funnel.requests_to("/track");
    assert_eq!(tracked.len(), 1);
    assert!(tracked[0].body.contains("\"Error\""));
    assert!(tracked[0].body.contains("insert"));

    let captured = sinks.insight.requests_to("/capture/");
    assert_eq!(captured.len(), 1);
    assert!(captured[0].body.contains("error_message"));
}

#[tokio::test]
async fn vault_outage_does_not_suppress_the_analytics_backends() {
    let funnel = start_mock_backend(200, "1").await;
    let insight = start_mock_backend(200, r#"{"status":1}"#).await;

    let mut config = base_config();
    // The vault is first in the sink list and unreachable.
    config.telemetry.error_vault.endpoint = "http://127.0.0.1:1/api/store".to_string();
    config.telemetry.funnel.token = "token-1".to_string();
    config.telemetry.funnel.endpoint = funnel.url();
    config.telemetry.insight.api_key = "phk-1".to_string();
    config.telemetry.insight.host = insight.url();
    let addr = start_gateway(config).await;

    let response = reqwest::Client::new()
        .post(format!("http://{}/api/telemetry/error", addr))
        .json(&json!({ "message": "boom" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 202);

    assert_eq!(funnel.requests_to("/track").len(), 1);
    assert_eq!(insight.requests_to("/capture/").len(), 1);
}

#[tokio::test]
async fn performance_report_fans_out_one_event_per_metric() {
    let (addr, sinks) = gateway_with_all_sinks().await;

    reqwest::Client::new()
        .post(format!("http://{}/api/telemetry/performance", addr))
        .json(&json!({ "fcp": 812.5, "cls": 0.02 }))
        .send()
        .await
        .unwrap();

    let tracked = sinks.funnel.requests_to("/track");
    assert_eq!(tracked.len(), 2);
    assert!(tracked[0].body.contains("Performance_FCP"));
    assert!(tracked[1].body.contains("Performance_CLS"));

    let captured = sinks.insight.requests_to("/capture/");
    assert_eq!(captured.len(), 2);
    assert!(captured[0].body.contains("performance_fcp"));

    // Metrics become breadcrumbs on the vault side; no request until
    // the next captured error carries them.
    assert!(sinks.vault.requests().is_empty());

    reqwest::Client::new()
        .post(format!("http://{}/api/telemetry/error", addr))
        .json(&json!({ "message": "boom" }))
        .send()
        .await
        .unwrap();

    let stored = sinks.vault.requests_to("/api/store");
    assert_eq!(stored.len(), 1);
    assert!(stored[0].body.contains("FCP: 812.5"));
}

#[tokio::test]
async fn session_start_and_end_are_correlated_by_the_returned_record() {
    let (addr, sinks) = gateway_with_all_sinks().await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("http://{}/api/telemetry/session/start", addr))
        .json(&json!({
            "user_id": "u-9",
            "user_agent": "test-agent",
            "screen_resolution": "1920x1080",
            "locale": "en-AU",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let record: serde_json::Value = response.json().await.unwrap();
    assert!(record["session_id"].is_string());

    let response = client
        .post(format!("http://{}/api/telemetry/session/end", addr))
        .json(&record)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 202);

    // Identification plus start and end events on the funnel side.
    assert_eq!(sinks.funnel.requests_to("/engage").len(), 1);
    let tracked = sinks.funnel.requests_to("/track");
    assert_eq!(tracked.len(), 2);
    assert!(tracked[0].body.contains("Session_Start"));
    assert!(tracked[1].body.contains("Session_End"));
    assert!(tracked[1].body.contains("duration"));
    assert!(tracked[1].body.contains(record["session_id"].as_str().unwrap()));
}
