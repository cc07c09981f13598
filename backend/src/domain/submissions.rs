//! Form submission service.
//!
//! Validates raw form documents with their [`Schema`] and forwards the
//! resulting entities through the [`SubmissionGateway`]. Nothing reaches the
//! gateway unless every field constraint passed.

use std::sync::Arc;

use serde_json::{Value, json};
use tracing::{info, warn};

use super::auth::SignedInMember;
use super::content::Applicant;
use super::forms::{
    Application, Contact, HelpRequest, PasswordResetConfirm, PasswordResetRequest, Schema,
    SettingsUpdate, SignIn, SignUp, Testimonial,
};
use super::ports::{SubmissionError, SubmissionGateway};
use super::Error;

fn map_submission_error(error: SubmissionError) -> Error {
    match error {
        SubmissionError::Transport { message } => {
            Error::upstream_unavailable(format!("membership service unavailable: {message}"))
        }
        SubmissionError::Rejected { status: 401, message } => Error::unauthorized(message),
        SubmissionError::Rejected { status: 403, message } => Error::forbidden(message),
        SubmissionError::Rejected { status, message } if (400..500).contains(&status) => {
            Error::invalid_request(message).with_details(json!({ "upstreamStatus": status }))
        }
        SubmissionError::Rejected { status, message } => {
            Error::upstream_unavailable(message).with_details(json!({ "upstreamStatus": status }))
        }
        SubmissionError::Decode { message } => Error::upstream_unavailable(format!(
            "membership service sent an unexpected response: {message}"
        )),
    }
}

fn ensure_owner(member: &SignedInMember, user_id: &str) -> Result<(), Error> {
    if member.id == user_id {
        Ok(())
    } else {
        Err(Error::forbidden("user_id does not match the signed-in member"))
    }
}

/// Validates and forwards form submissions.
#[derive(Clone)]
pub struct SubmissionService {
    gateway: Arc<dyn SubmissionGateway>,
}

impl SubmissionService {
    /// Service forwarding through `gateway`.
    pub fn new(gateway: Arc<dyn SubmissionGateway>) -> Self {
        Self { gateway }
    }

    async fn forward<T, Fut>(form: &'static str, call: Fut) -> Result<T, Error>
    where
        Fut: std::future::Future<Output = Result<T, SubmissionError>>,
    {
        match call.await {
            Ok(value) => {
                info!(form, "submission accepted");
                Ok(value)
            }
            Err(error) => {
                warn!(form, %error, "submission failed");
                Err(map_submission_error(error))
            }
        }
    }

    /// # Errors
    /// `validation_failed` for bad input, `unauthorized` for rejected
    /// credentials, `upstream_unavailable` when the API fails.
    pub async fn sign_in(&self, raw: Value) -> Result<SignedInMember, Error> {
        let credentials = SignIn::parse_json(raw)?;
        Self::forward("sign_in", self.gateway.sign_in(&credentials)).await
    }

    /// # Errors
    /// See [`SubmissionService::sign_in`].
    pub async fn sign_up(&self, raw: Value) -> Result<SignedInMember, Error> {
        let request = SignUp::parse_json(raw)?;
        Self::forward("sign_up", self.gateway.sign_up(&request)).await
    }

    /// # Errors
    /// See [`SubmissionService::sign_in`].
    pub async fn request_password_reset(&self, raw: Value) -> Result<(), Error> {
        let request = PasswordResetRequest::parse_json(raw)?;
        Self::forward(
            "password_reset_request",
            self.gateway.request_password_reset(&request),
        )
        .await
    }

    /// # Errors
    /// See [`SubmissionService::sign_in`].
    pub async fn confirm_password_reset(&self, raw: Value) -> Result<(), Error> {
        let request = PasswordResetConfirm::parse_json(raw)?;
        Self::forward(
            "password_reset_confirm",
            self.gateway.confirm_password_reset(&request),
        )
        .await
    }

    /// Submit a membership application on behalf of `member`.
    ///
    /// # Errors
    /// `forbidden` when the form names another user.
    pub async fn submit_application(
        &self,
        member: &SignedInMember,
        raw: Value,
    ) -> Result<Applicant, Error> {
        let application = Application::parse_json(raw)?;
        ensure_owner(member, application.user_id())?;
        Self::forward("application", self.gateway.submit_application(&application)).await
    }

    /// Update one setting for `member`.
    ///
    /// # Errors
    /// `forbidden` when the form names another user.
    pub async fn update_settings(
        &self,
        member: &SignedInMember,
        raw: Value,
    ) -> Result<SettingsUpdate, Error> {
        let update = SettingsUpdate::parse_json(raw)?;
        ensure_owner(member, update.user_id())?;
        Self::forward("settings", self.gateway.update_settings(&update)).await?;
        Ok(update)
    }

    /// # Errors
    /// See [`SubmissionService::sign_in`].
    pub async fn submit_testimonial(&self, raw: Value) -> Result<(), Error> {
        let testimonial = Testimonial::parse_json(raw)?;
        Self::forward("testimonial", self.gateway.submit_testimonial(&testimonial)).await
    }

    /// # Errors
    /// See [`SubmissionService::sign_in`].
    pub async fn submit_help_request(&self, raw: Value) -> Result<(), Error> {
        let request = HelpRequest::parse_json(raw)?;
        Self::forward("help", self.gateway.submit_help_request(&request)).await
    }

    /// # Errors
    /// See [`SubmissionService::sign_in`].
    pub async fn submit_contact(&self, raw: Value) -> Result<(), Error> {
        let contact = Contact::parse_json(raw)?;
        Self::forward("contact", self.gateway.submit_contact(&contact)).await
    }
}
