//! HTTP server setup.
//!
//! Builds the flow objects from configuration, wires them into one
//! shared state, and serves the public routes with the standard
//! middleware stack (request IDs, tracing, timeout, body limit).

use std::sync::Arc;
use std::time::Duration;

use axum::routing::{get, post};
use axum::Router;
use thiserror::Error;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::config::GatewayConfig;
use crate::contact::{ContactFlow, HttpNotifier, NotifyError, RestDirectory, StoreError};
use crate::http::handlers;
use crate::payments::{HostedProcessor, PaymentProcessor, ProcessorError};
use crate::telemetry::{SinkError, Telemetry};

/// Errors constructing the gateway's components from configuration.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("telemetry: {0}")]
    Telemetry(#[from] SinkError),

    #[error("contact directory: {0}")]
    Directory(#[from] StoreError),

    #[error("notifier: {0}")]
    Notifier(#[from] NotifyError),

    #[error("payment processor: {0}")]
    Processor(#[from] ProcessorError),
}

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub contact: Arc<ContactFlow>,
    pub processor: Arc<dyn PaymentProcessor>,
    pub telemetry: Telemetry,
    pub return_origin: String,
}

/// The gateway HTTP server.
pub struct HttpServer {
    config: GatewayConfig,
    state: AppState,
}

impl HttpServer {
    /// Build every component from configuration.
    pub fn from_config(config: GatewayConfig) -> Result<Self, BuildError> {
        let telemetry = Telemetry::from_config(&config.telemetry)?;
        let store = Arc::new(RestDirectory::new(&config.directory)?);
        let notifier = Arc::new(HttpNotifier::new(&config.notify)?);
        let contact = Arc::new(ContactFlow::new(store, notifier, telemetry.clone()));
        let processor: Arc<dyn PaymentProcessor> = Arc::new(HostedProcessor::new(&config.payments)?);

        let state = AppState {
            contact,
            processor,
            telemetry,
            return_origin: config.payments.return_origin.clone(),
        };
        Ok(Self::new(config, state))
    }

    /// Wrap pre-built state; tests use this to substitute doubles.
    pub fn new(config: GatewayConfig, state: AppState) -> Self {
        Self { config, state }
    }

    pub fn router(&self) -> Router {
        let middleware = ServiceBuilder::new()
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
            .layer(TraceLayer::new_for_http())
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(RequestBodyLimitLayer::new(self.config.server.max_body_bytes))
            .layer(TimeoutLayer::new(Duration::from_secs(
                self.config.server.request_timeout_secs,
            )));

        Router::new()
            .route("/health", get(handlers::health))
            .route("/api/contact", post(handlers::submit_contact))
            .route("/api/checkout", post(handlers::confirm_checkout))
            .route("/api/telemetry/event", post(handlers::ingest_event))
            .route("/api/telemetry/feature", post(handlers::ingest_feature))
            .route("/api/telemetry/error", post(handlers::ingest_error))
            .route("/api/telemetry/performance", post(handlers::ingest_performance))
            .route("/api/telemetry/session/start", post(handlers::session_start))
            .route("/api/telemetry/session/end", post(handlers::session_end))
            .layer(middleware)
            .with_state(self.state.clone())
    }

    /// Serve until the process receives a shutdown signal.
    pub async fn run(self, listener: TcpListener) -> std::io::Result<()> {
        let router = self.router();
        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await
    }
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        tracing::info!("shutdown signal received");
    }
}
