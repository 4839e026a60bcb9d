//! Contact submission types and validation rules.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// A submitted contact inquiry. Validated synchronously before any
/// I/O; a failing field blocks submission with a field-level message
/// and nothing is written anywhere.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ContactSubmission {
    #[validate(length(min = 2, message = "Name is required"))]
    pub name: String,

    #[validate(email(message = "Invalid email address"))]
    pub email: String,

    #[validate(length(min = 2, message = "Company name is required"))]
    pub company: String,

    #[validate(length(min = 10, message = "Message must be at least 10 characters"))]
    pub message: String,
}

/// The row written to the contact directory. Identical to the
/// submission plus the fixed `source` tag.
#[derive(Debug, Clone, Serialize)]
pub struct ContactRecord {
    pub name: String,
    pub email: String,
    pub company: String,
    pub message: String,
    pub source: &'static str,
}

impl From<&ContactSubmission> for ContactRecord {
    fn from(submission: &ContactSubmission) -> Self {
        Self {
            name: submission.name.clone(),
            email: submission.email.clone(),
            company: submission.company.clone(),
            message: submission.message.clone(),
            source: "web",
        }
    }
}
