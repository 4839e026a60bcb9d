//! Checkout session state machine.
//!
//! `Idle → Processing → {Succeeded, Failed}`. Terminal states are
//! never re-armed; a new attempt requires a new session. The
//! processing state is released on every path out of `submit`,
//! including transport errors.

use std::sync::Arc;

use serde_json::json;

use crate::observability::metrics;
use crate::payments::processor::PaymentProcessor;
use crate::payments::types::{
    ConfirmResult, PaymentIntentContext, PaymentOutcome, UNEXPECTED_ERROR_MESSAGE,
};
use crate::telemetry::Telemetry;

type SuccessCallback = Box<dyn Fn() + Send + Sync>;
type ErrorCallback = Box<dyn Fn(&str) + Send + Sync>;

/// One checkout attempt against a previously created payment intent.
pub struct CheckoutSession {
    context: PaymentIntentContext,
    return_url: String,
    telemetry: Telemetry,
    processor: Option<Arc<dyn PaymentProcessor>>,
    outcome: PaymentOutcome,
    on_success: Option<SuccessCallback>,
    on_error: Option<ErrorCallback>,
}

impl CheckoutSession {
    /// Create an idle session. Submission is a no-op until a processor
    /// handle is attached.
    pub fn new(context: PaymentIntentContext, return_origin: &str, telemetry: Telemetry) -> Self {
        let return_url = format!("{}/payment/complete", return_origin.trim_end_matches('/'));
        Self {
            context,
            return_url,
            telemetry,
            processor: None,
            outcome: PaymentOutcome::Idle,
            on_success: None,
            on_error: None,
        }
    }

    pub fn attach_processor(&mut self, processor: Arc<dyn PaymentProcessor>) {
        self.processor = Some(processor);
    }

    pub fn on_success(mut self, callback: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_success = Some(Box::new(callback));
        self
    }

    pub fn on_error(mut self, callback: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.on_error = Some(Box::new(callback));
        self
    }

    pub fn outcome(&self) -> &PaymentOutcome {
        &self.outcome
    }

    pub fn context(&self) -> &PaymentIntentContext {
        &self.context
    }

    fn attempt_properties(&self) -> serde_json::Value {
        json!({
            "amount": self.context.amount,
            "currency": self.context.currency,
            "product_id": self.context.product_id,
        })
    }

    fn error_properties(&self, message: &str) -> serde_json::Value {
        json!({
            "error": message,
            "amount": self.context.amount,
            "currency": self.context.currency,
            "product_id": self.context.product_id,
        })
    }

    /// Submit the payment for confirmation.
    ///
    /// Not ready (no processor attached) or already past `Idle`: the
    /// call is a no-op with no state transition and no analytics
    /// event. Otherwise the session transitions to `Processing`, asks
    /// the processor to confirm, and lands in exactly one terminal
    /// state:
    /// - in-band failure → `Failed(message)`, error callback once;
    /// - no inline failure → `Succeeded`, success callback once;
    /// - out-of-band error → `Failed` with a normalized display
    ///   message, the verbatim error forwarded to the callback and to
    ///   analytics.
    pub async fn submit(&mut self) -> &PaymentOutcome {
        let Some(processor) = self.processor.clone() else {
            return &self.outcome;
        };
        if self.outcome != PaymentOutcome::Idle {
            return &self.outcome;
        }

        self.outcome = PaymentOutcome::Processing;
        self.telemetry
            .track_event("Payment Attempt", self.attempt_properties())
            .await;

        match processor
            .confirm_payment(&self.context.client_secret, &self.return_url)
            .await
        {
            Ok(ConfirmResult {
                failure: Some(failure),
            }) => {
                metrics::record_payment("declined");
                self.outcome = PaymentOutcome::Failed(failure.message.clone());
                if let Some(callback) = &self.on_error {
                    callback(&failure.message);
                }
                self.telemetry
                    .track_event("Payment Error", self.error_properties(&failure.message))
                    .await;
            }
            Ok(ConfirmResult { failure: None }) => {
                metrics::record_payment("succeeded");
                self.outcome = PaymentOutcome::Succeeded;
                if let Some(callback) = &self.on_success {
                    callback();
                }
                self.telemetry
                    .track_event("Payment Success", self.attempt_properties())
                    .await;
            }
            Err(e) => {
                let detail = e.to_string();
                tracing::error!(error = %detail, "payment confirmation failed");
                metrics::record_payment("error");
                self.outcome = PaymentOutcome::Failed(UNEXPECTED_ERROR_MESSAGE.to_string());
                if let Some(callback) = &self.on_error {
                    callback(&detail);
                }
                self.telemetry
                    .track_event("Payment Error", self.error_properties(&detail))
                    .await;
            }
        }

        &self.outcome
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::payments::types::{InlineFailure, ProcessorError};
    use crate::telemetry::sink::doubles::RecordingSink;
    use crate::telemetry::TelemetrySink;

    enum Script {
        Succeed,
        Decline(&'static str),
        Fail,
    }

    struct StubProcessor {
        script: Script,
        calls: AtomicUsize,
    }

    impl StubProcessor {
        fn new(script: Script) -> Arc<Self> {
            Arc::new(Self {
                script,
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl PaymentProcessor for StubProcessor {
        async fn confirm_payment(
            &self,
            _client_secret: &str,
            _return_url: &str,
        ) -> Result<ConfirmResult, ProcessorError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.script {
                Script::Succeed => Ok(ConfirmResult { failure: None }),
                Script::Decline(message) => Ok(ConfirmResult {
                    failure: Some(InlineFailure {
                        message: message.to_string(),
                        code: Some("card_declined".to_string()),
                    }),
                }),
                Script::Fail => Err(ProcessorError::Status {
                    status: 500,
                    message: "internal".to_string(),
                }),
            }
        }
    }

    fn context() -> PaymentIntentContext {
        PaymentIntentContext {
            amount: 4900,
            currency: "aud".into(),
            product_id: "prod_enterprise".into(),
            client_secret: "pi_123_secret_456".into(),
        }
    }

    fn session_with_sink() -> (CheckoutSession, Arc<RecordingSink>) {
        let sink = Arc::new(RecordingSink::new("analytics"));
        let telemetry = Telemetry::with_sinks(vec![sink.clone() as Arc<dyn TelemetrySink>]);
        let session = CheckoutSession::new(context(), "https://shop.example", telemetry);
        (session, sink)
    }

    #[tokio::test]
    async fn submit_without_processor_is_a_no_op() {
        let (mut session, sink) = session_with_sink();

        assert_eq!(session.submit().await, &PaymentOutcome::Idle);
        assert!(sink.events().is_empty());
    }

    #[tokio::test]
    async fn successful_confirmation_invokes_success_callback_once() {
        let (session, sink) = session_with_sink();
        let successes = Arc::new(AtomicUsize::new(0));
        let failures = Arc::new(AtomicUsize::new(0));
        let (s, f) = (successes.clone(), failures.clone());

        let mut session = session
            .on_success(move || {
                s.fetch_add(1, Ordering::SeqCst);
            })
            .on_error(move |_| {
                f.fetch_add(1, Ordering::SeqCst);
            });
        session.attach_processor(StubProcessor::new(Script::Succeed));

        assert_eq!(session.submit().await, &PaymentOutcome::Succeeded);
        assert_eq!(successes.load(Ordering::SeqCst), 1);
        assert_eq!(failures.load(Ordering::SeqCst), 0);

        let names: Vec<_> = sink.events().into_iter().map(|e| e.name).collect();
        assert_eq!(names, vec!["Payment Attempt", "Payment Success"]);
    }

    #[tokio::test]
    async fn inline_decline_invokes_error_callback_with_processor_message() {
        let (session, sink) = session_with_sink();
        let messages = Arc::new(Mutex::new(Vec::new()));
        let m = messages.clone();

        let mut session = session.on_error(move |message| {
            m.lock().unwrap().push(message.to_string());
        });
        session.attach_processor(StubProcessor::new(Script::Decline("Your card was declined")));

        assert_eq!(
            session.submit().await,
            &PaymentOutcome::Failed("Your card was declined".to_string())
        );
        assert_eq!(messages.lock().unwrap().as_slice(), ["Your card was declined"]);

        let events = sink.events();
        assert_eq!(events[1].name, "Payment Error");
        assert_eq!(
            events[1].properties.get("error"),
            Some(&serde_json::json!("Your card was declined"))
        );
        assert_eq!(events[1].properties.get("amount"), Some(&serde_json::json!(4900)));
    }

    #[tokio::test]
    async fn transport_error_is_normalized_for_display_but_verbatim_elsewhere() {
        let (session, sink) = session_with_sink();
        let messages = Arc::new(Mutex::new(Vec::new()));
        let m = messages.clone();

        let mut session = session.on_error(move |message| {
            m.lock().unwrap().push(message.to_string());
        });
        session.attach_processor(StubProcessor::new(Script::Fail));

        assert_eq!(
            session.submit().await,
            &PaymentOutcome::Failed(UNEXPECTED_ERROR_MESSAGE.to_string())
        );

        // Callback and analytics carry the verbatim error, not the
        // normalized display message.
        let forwarded = messages.lock().unwrap().clone();
        assert_eq!(forwarded.len(), 1);
        assert!(forwarded[0].contains("500"));

        let events = sink.events();
        assert_eq!(events[1].name, "Payment Error");
        let reported = events[1].properties.get("error").and_then(|v| v.as_str()).unwrap();
        assert_ne!(reported, UNEXPECTED_ERROR_MESSAGE);
    }

    #[tokio::test]
    async fn terminal_session_is_not_re_armed() {
        let (mut session, sink) = session_with_sink();
        let processor = StubProcessor::new(Script::Succeed);
        session.attach_processor(processor.clone());

        assert_eq!(session.submit().await, &PaymentOutcome::Succeeded);
        assert_eq!(session.submit().await, &PaymentOutcome::Succeeded);
        assert_eq!(processor.calls.load(Ordering::SeqCst), 1);
        // Attempt + success only, no second attempt event.
        assert_eq!(sink.events().len(), 2);
    }

    #[tokio::test]
    async fn processing_is_never_left_set() {
        for script in [Script::Succeed, Script::Decline("no"), Script::Fail] {
            let (mut session, _sink) = session_with_sink();
            session.attach_processor(StubProcessor::new(script));
            let outcome = session.submit().await;
            assert!(outcome.is_terminal());
        }
    }

    #[test]
    fn return_url_is_origin_plus_completion_path() {
        let session = CheckoutSession::new(context(), "https://shop.example/", Telemetry::disabled());
        assert_eq!(session.return_url, "https://shop.example/payment/complete");
    }
}
