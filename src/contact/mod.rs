//! Contact submission flow: validate, persist to the hosted directory,
//! fire a best-effort notification, and emit analytics at each stage.

pub mod directory;
pub mod flow;
pub mod notify;
pub mod types;

pub use directory::{ContactStore, RestDirectory, StoreError};
pub use flow::{ContactError, ContactFlow};
pub use notify::{HttpNotifier, NotificationSender, NotifyError};
pub use types::{ContactRecord, ContactSubmission};
