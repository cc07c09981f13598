//! Write-side port: validated forms forwarded to the remote API.

use async_trait::async_trait;

use crate::domain::auth::SignedInMember;
use crate::domain::content::Applicant;
use crate::domain::forms::{
    Application, Contact, HelpRequest, PasswordResetConfirm, PasswordResetRequest, SettingsUpdate,
    SignIn, SignUp, Testimonial,
};

use super::define_port_error;

define_port_error! {
    /// Errors raised when forwarding a submission.
    pub enum SubmissionError {
        /// The API could not be reached.
        Transport { message: String } =>
            "could not reach the membership service: {message}",
        /// The API refused the submission.
        Rejected { status: u16, message: String } =>
            "{message}",
        /// The API accepted the request but replied with an unexpected body.
        Decode { message: String } =>
            "membership service sent an unexpected response: {message}",
    }
}

impl SubmissionError {
    /// Whether the API refused the request because of the caller's input or
    /// credentials rather than failing itself.
    pub fn is_client_rejection(&self) -> bool {
        matches!(self, Self::Rejected { status, .. } if (400..500).contains(status))
    }
}

/// Forwards validated entities to the remote API.
///
/// Only entities that passed their schema reach this port.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SubmissionGateway: Send + Sync {
    /// `POST /auth/sign-in`
    async fn sign_in(&self, credentials: &SignIn) -> Result<SignedInMember, SubmissionError>;

    /// `POST /auth/sign-up`
    async fn sign_up(&self, request: &SignUp) -> Result<SignedInMember, SubmissionError>;

    /// `POST /auth/password-reset/request`
    async fn request_password_reset(
        &self,
        request: &PasswordResetRequest,
    ) -> Result<(), SubmissionError>;

    /// `POST /auth/password-reset/confirm`
    async fn confirm_password_reset(
        &self,
        request: &PasswordResetConfirm,
    ) -> Result<(), SubmissionError>;

    /// `POST /applications`
    async fn submit_application(
        &self,
        application: &Application,
    ) -> Result<Applicant, SubmissionError>;

    /// `PUT /settings`
    async fn update_settings(&self, update: &SettingsUpdate) -> Result<(), SubmissionError>;

    /// `POST /testimonials`
    async fn submit_testimonial(&self, testimonial: &Testimonial) -> Result<(), SubmissionError>;

    /// `POST /help`
    async fn submit_help_request(&self, request: &HelpRequest) -> Result<(), SubmissionError>;

    /// `POST /contact`
    async fn submit_contact(&self, contact: &Contact) -> Result<(), SubmissionError>;
}
