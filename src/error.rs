//! HTTP error mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Map, Value};
use thiserror::Error;

use crate::contact::ContactError;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error(transparent)]
    Contact(#[from] ContactError),
}

fn field_messages(errors: &validator::ValidationErrors) -> Map<String, Value> {
    errors
        .field_errors()
        .iter()
        .map(|(field, field_errors)| {
            let message = field_errors
                .first()
                .and_then(|e| e.message.as_ref())
                .map(|m| m.to_string())
                .unwrap_or_else(|| "invalid".to_string());
            (field.to_string(), Value::String(message))
        })
        .collect()
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        match self {
            // Field-level messages so the caller can surface each one
            // next to its input; nothing was written.
            GatewayError::Contact(ContactError::Invalid(errors)) => (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "error": "validation_failed",
                    "fields": field_messages(&errors),
                })),
            )
                .into_response(),

            GatewayError::Contact(ContactError::Busy) => (
                StatusCode::CONFLICT,
                Json(json!({ "error": "submission_in_flight" })),
            )
                .into_response(),

            // Runtime failures collapse to one generic message for the
            // user; the details went to logs and analytics already.
            GatewayError::Contact(ContactError::Store(e)) => {
                tracing::error!(error = %e, "contact store error");
                (
                    StatusCode::BAD_GATEWAY,
                    Json(json!({
                        "error": "contact_failed",
                        "message": "Something went wrong. Please try again.",
                    })),
                )
                    .into_response()
            }
        }
    }
}
