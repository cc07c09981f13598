//! Public contact form.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::Schema;
use crate::domain::validation::{Issues, Validator};

/// Raw contact submission.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct ContactInput {
    /// Sender name.
    pub name: Option<String>,
    /// Sender email.
    pub email: Option<String>,
    /// Optional phone number.
    pub phone: Option<String>,
    /// Subject line.
    pub subject: Option<String>,
    /// Message body.
    pub message: Option<String>,
}

/// Validated contact message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Contact {
    name: String,
    email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    phone: Option<String>,
    subject: String,
    message: String,
}

impl Schema for Contact {
    type Input = ContactInput;

    fn validate(input: ContactInput) -> Result<Self, Issues> {
        let mut v = Validator::new();
        let name = v
            .required("name", input.name)
            .and_then(|n| v.length("name", n, 2, 100));
        let email = v.required("email", input.email).and_then(|e| v.email("email", e));
        let phone = Validator::optional(input.phone).map(|p| v.phone("phone", p));
        let subject = v
            .required("subject", input.subject)
            .and_then(|s| v.length("subject", s, 1, 150));
        let message = v
            .required("message", input.message)
            .and_then(|m| v.length("message", m, 10, 2000));
        v.finish(|| {
            Some(Self {
                name: name?,
                email: email?,
                phone: phone.map_or(Some(None), |p| p.map(Some))?,
                subject: subject?,
                message: message?,
            })
        })
    }
}
