//! Payment flow types.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Message shown for failures that occurred before the processor could
/// report anything in-band.
pub const UNEXPECTED_ERROR_MESSAGE: &str = "An unexpected error occurred";

/// Everything a checkout session needs, issued before the session is
/// created and immutable for its lifetime. The client secret is an
/// opaque token authorizing exactly one confirmation attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentIntentContext {
    /// Amount in minor currency units.
    pub amount: i64,
    /// ISO currency code.
    pub currency: String,
    pub product_id: String,
    pub client_secret: String,
}

/// Checkout state. `Succeeded` and `Failed` are terminal: a session is
/// never re-armed, a new attempt requires a new session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "message", rename_all = "snake_case")]
pub enum PaymentOutcome {
    Idle,
    Processing,
    Succeeded,
    Failed(String),
}

impl PaymentOutcome {
    pub fn is_terminal(&self) -> bool {
        matches!(self, PaymentOutcome::Succeeded | PaymentOutcome::Failed(_))
    }
}

/// A failure the processor reported in-band, inside an otherwise
/// normal confirmation response (a decline, as opposed to a thrown
/// transport error).
#[derive(Debug, Clone, Deserialize)]
pub struct InlineFailure {
    pub message: String,
    pub code: Option<String>,
}

/// The processor's reply to a confirmation attempt: either an inline
/// failure descriptor, or an implicit success by its absence.
#[derive(Debug, Clone, Default)]
pub struct ConfirmResult {
    pub failure: Option<InlineFailure>,
}

/// Out-of-band errors raised before a confirmation response was
/// obtainable.
#[derive(Debug, Error)]
pub enum ProcessorError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("processor returned status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("malformed client secret")]
    MalformedSecret,

    #[error("invalid processor configuration: {0}")]
    Config(String),
}
