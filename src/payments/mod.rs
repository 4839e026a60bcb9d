//! Payment flow: a checkout session wraps one confirmation attempt
//! against the hosted processor, with analytics at each stage.

pub mod checkout;
pub mod processor;
pub mod types;

pub use checkout::CheckoutSession;
pub use processor::{HostedProcessor, PaymentProcessor};
pub use types::{
    ConfirmResult, InlineFailure, PaymentIntentContext, PaymentOutcome, ProcessorError,
    UNEXPECTED_ERROR_MESSAGE,
};
