//! Contact submission pipeline.
//!
//! Ordering on a valid submission: attempt event → directory insert →
//! best-effort notification → success event. A rejected insert aborts
//! the flow with an error event carrying the rejection message; the
//! notification result never affects the outcome. At most one
//! submission is in flight per flow instance, enforced by an explicit
//! claim rather than a disabled button.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde_json::json;
use thiserror::Error;
use validator::Validate;

use crate::contact::directory::{ContactStore, StoreError};
use crate::contact::notify::NotificationSender;
use crate::contact::types::{ContactRecord, ContactSubmission};
use crate::observability::metrics;
use crate::telemetry::Telemetry;

/// Errors surfaced to the submitter.
#[derive(Debug, Error)]
pub enum ContactError {
    /// A second submit arrived while one was in flight. No side
    /// effects occurred.
    #[error("a submission is already in flight")]
    Busy,

    /// One or more fields failed validation. Nothing was written and
    /// no analytics event was emitted.
    #[error("validation failed")]
    Invalid(#[from] validator::ValidationErrors),

    /// The directory rejected the insert.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Releases the in-flight claim on every exit path, panics included.
struct InFlightGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> InFlightGuard<'a> {
    fn claim(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { flag })
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// The contact submission flow.
pub struct ContactFlow {
    store: Arc<dyn ContactStore>,
    notifier: Arc<dyn NotificationSender>,
    telemetry: Telemetry,
    in_flight: AtomicBool,
}

impl ContactFlow {
    pub fn new(
        store: Arc<dyn ContactStore>,
        notifier: Arc<dyn NotificationSender>,
        telemetry: Telemetry,
    ) -> Self {
        Self {
            store,
            notifier,
            telemetry,
            in_flight: AtomicBool::new(false),
        }
    }

    /// Whether a submission is currently in flight.
    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Validate and submit one inquiry.
    ///
    /// On error the caller's field values are untouched so the form
    /// can be retried as-is; on success the caller should reset.
    pub async fn submit(&self, submission: &ContactSubmission) -> Result<(), ContactError> {
        submission.validate()?;

        let _guard = InFlightGuard::claim(&self.in_flight).ok_or(ContactError::Busy)?;

        self.telemetry
            .track_event(
                "Enterprise Contact Form Submit",
                json!({ "company": submission.company }),
            )
            .await;

        let record = ContactRecord::from(submission);
        if let Err(e) = self.store.insert(&record).await {
            tracing::error!(error = %e, "contact submission failed");
            metrics::record_contact_submission("error");
            self.telemetry
                .track_event(
                    "Enterprise Contact Form Error",
                    json!({ "error": e.to_string() }),
                )
                .await;
            return Err(e.into());
        }

        self.notifier.send(submission).await;

        metrics::record_contact_submission("success");
        self.telemetry
            .track_event(
                "Enterprise Contact Form Success",
                json!({ "company": submission.company }),
            )
            .await;

        Ok(())
    }
}
