//! Shared utilities for integration testing.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::body::Bytes;
use axum::http::{StatusCode, Uri};
use axum::Router;
use tokio::net::TcpListener;

use site_gateway::config::GatewayConfig;
use site_gateway::HttpServer;

/// One request captured by a mock backend.
#[derive(Clone, Debug)]
pub struct CapturedRequest {
    pub path: String,
    pub body: String,
}

/// A mock external service recording every request it receives.
#[derive(Clone)]
pub struct MockBackend {
    pub addr: SocketAddr,
    requests: Arc<Mutex<Vec<CapturedRequest>>>,
}

impl MockBackend {
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn requests(&self) -> Vec<CapturedRequest> {
        self.requests.lock().unwrap().clone()
    }

    #[allow(dead_code)]
    pub fn requests_to(&self, path: &str) -> Vec<CapturedRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.path == path)
            .collect()
    }
}

/// Start a mock backend answering every request with `status` and the
/// given body.
pub async fn start_mock_backend(status: u16, body: &'static str) -> MockBackend {
    let requests = Arc::new(Mutex::new(Vec::new()));
    let captured = requests.clone();

    let app = Router::new().fallback(move |uri: Uri, request_body: Bytes| {
        let captured = captured.clone();
        async move {
            captured.lock().unwrap().push(CapturedRequest {
                path: uri.path().to_string(),
                body: String::from_utf8_lossy(&request_body).to_string(),
            });
            (
                StatusCode::from_u16(status).unwrap_or(StatusCode::OK),
                [("content-type", "application/json")],
                body,
            )
        }
    });

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    MockBackend { addr, requests }
}

/// Start the gateway on an ephemeral port and return its address.
pub async fn start_gateway(config: GatewayConfig) -> SocketAddr {
    let server = HttpServer::from_config(config).expect("gateway should build");
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let router = server.router();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}

/// A baseline configuration with every external dependency pointed at
/// an unroutable port and all telemetry sinks disabled. Tests switch
/// on exactly the backends they mock.
#[allow(dead_code)]
pub fn base_config() -> GatewayConfig {
    let mut config = GatewayConfig::default();
    config.directory.base_url = "http://127.0.0.1:1".to_string();
    config.directory.api_key = "test-key".to_string();
    config.notify.endpoint = "http://127.0.0.1:1/api/notify-enterprise-contact".to_string();
    config.payments.public_key = "pk_test_1".to_string();
    config.payments.api_base = "http://127.0.0.1:1".to_string();
    config.telemetry.error_vault.endpoint = String::new();
    config.telemetry.funnel.token = String::new();
    config.telemetry.insight.api_key = String::new();
    config
}
