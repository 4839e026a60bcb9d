//! Request handlers for the gateway's public surface.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::contact::ContactSubmission;
use crate::error::GatewayError;
use crate::http::server::AppState;
use crate::payments::{CheckoutSession, PaymentIntentContext, PaymentOutcome};
use crate::telemetry::{ClientInfo, ErrorReport, PerformanceReport, SessionRecord};

#[derive(Serialize)]
pub struct SystemStatus {
    pub version: &'static str,
    pub status: &'static str,
}

pub async fn health() -> Json<SystemStatus> {
    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION"),
        status: "operational",
    })
}

/// Validate and submit a contact inquiry.
///
/// 200 means the directory write succeeded and the caller should reset
/// its form; on any error the caller keeps the entered values.
pub async fn submit_contact(
    State(state): State<AppState>,
    Json(submission): Json<ContactSubmission>,
) -> Result<Json<Value>, GatewayError> {
    state.contact.submit(&submission).await?;
    Ok(Json(json!({
        "status": "received",
        "id": Uuid::new_v4(),
    })))
}

/// Run one checkout attempt. The response always carries the terminal
/// outcome; a decline is a normal response, not an HTTP error.
pub async fn confirm_checkout(
    State(state): State<AppState>,
    Json(context): Json<PaymentIntentContext>,
) -> Json<PaymentOutcome> {
    let mut session = CheckoutSession::new(context, &state.return_origin, state.telemetry.clone());
    session.attach_processor(state.processor.clone());
    session.submit().await;
    Json(session.outcome().clone())
}

#[derive(Deserialize)]
pub struct EventRequest {
    pub name: String,
    #[serde(default)]
    pub properties: Value,
}

pub async fn ingest_event(
    State(state): State<AppState>,
    Json(request): Json<EventRequest>,
) -> StatusCode {
    state.telemetry.track_event(&request.name, request.properties).await;
    StatusCode::ACCEPTED
}

#[derive(Deserialize)]
pub struct FeatureRequest {
    pub feature: String,
    #[serde(default)]
    pub metadata: Value,
}

pub async fn ingest_feature(
    State(state): State<AppState>,
    Json(request): Json<FeatureRequest>,
) -> StatusCode {
    state
        .telemetry
        .track_feature_usage(&request.feature, request.metadata)
        .await;
    StatusCode::ACCEPTED
}

pub async fn ingest_error(
    State(state): State<AppState>,
    Json(report): Json<ErrorReport>,
) -> StatusCode {
    state.telemetry.track_error(&report).await;
    StatusCode::ACCEPTED
}

pub async fn ingest_performance(
    State(state): State<AppState>,
    Json(report): Json<PerformanceReport>,
) -> StatusCode {
    state.telemetry.record_performance(&report).await;
    StatusCode::ACCEPTED
}

#[derive(Deserialize)]
pub struct SessionStartRequest {
    pub user_id: String,
    #[serde(flatten)]
    pub client: ClientInfo,
}

/// Identify the user and emit the session start record. The response
/// is the full record; the caller posts it back to `/session/end` so
/// the end record is correlated without server-side session state.
pub async fn session_start(
    State(state): State<AppState>,
    Json(request): Json<SessionStartRequest>,
) -> Json<SessionRecord> {
    let handle = state
        .telemetry
        .start_session(&request.user_id, request.client)
        .await;
    Json(handle.record().clone())
}

pub async fn session_end(
    State(state): State<AppState>,
    Json(record): Json<SessionRecord>,
) -> StatusCode {
    state.telemetry.end_session(record).await;
    StatusCode::ACCEPTED
}
