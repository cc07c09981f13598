//! Remote submission adapter.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Method;
use serde::Serialize;
use serde_json::Value;

use super::client::{ApiClient, ApiClientError, decode_value};
use crate::domain::auth::SignedInMember;
use crate::domain::content::{Applicant, Verify};
use crate::domain::forms::{
    Application, Contact, HelpRequest, PasswordResetConfirm, PasswordResetRequest, SettingsUpdate,
    SignIn, SignUp, Testimonial,
};
use crate::domain::ports::{SubmissionError, SubmissionGateway};

/// [`SubmissionGateway`] backed by the remote REST API.
#[derive(Debug, Clone)]
pub struct HttpSubmissionGateway {
    client: Arc<ApiClient>,
}

impl HttpSubmissionGateway {
    /// Gateway sending submissions through `client`.
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    async fn post<B: Serialize + Sync>(&self, segments: &[&str], body: &B) -> Result<Value, SubmissionError> {
        self.call(Method::POST, segments, body).await
    }

    async fn call<B: Serialize + Sync>(
        &self,
        method: Method,
        segments: &[&str],
        body: &B,
    ) -> Result<Value, SubmissionError> {
        let bytes = self
            .client
            .send(method, segments, body)
            .await
            .map_err(map_client_error)?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Value::Null);
        }
        serde_json::from_slice(&bytes).map_err(|error| SubmissionError::decode(error.to_string()))
    }
}

fn map_client_error(error: ApiClientError) -> SubmissionError {
    match error {
        ApiClientError::Url { message } | ApiClientError::Transport { message, .. } => {
            SubmissionError::transport(message)
        }
        ApiClientError::Status { status, message } => SubmissionError::rejected(status, message),
        ApiClientError::Decode { message } => SubmissionError::decode(message),
    }
}

/// Pull the member out of an auth response.
///
/// Accepts the member itself, a `{data: member}` envelope, or either of
/// those nested under `user`.
fn decode_member(body: Value) -> Result<SignedInMember, SubmissionError> {
    let candidates = [
        Some(body.clone()),
        body.get("user").cloned(),
        body.get("data").and_then(|data| data.get("user")).cloned(),
    ];
    let member = candidates
        .into_iter()
        .flatten()
        .find_map(|candidate| decode_value::<SignedInMember>(candidate).ok())
        .ok_or_else(|| SubmissionError::decode("auth response did not include a member"))?;
    member.verify().map_err(SubmissionError::decode)?;
    Ok(member)
}

#[async_trait]
impl SubmissionGateway for HttpSubmissionGateway {
    async fn sign_in(&self, credentials: &SignIn) -> Result<SignedInMember, SubmissionError> {
        let body = self.post(&["auth", "sign-in"], credentials).await?;
        decode_member(body)
    }

    async fn sign_up(&self, request: &SignUp) -> Result<SignedInMember, SubmissionError> {
        let body = self.post(&["auth", "sign-up"], request).await?;
        decode_member(body)
    }

    async fn request_password_reset(
        &self,
        request: &PasswordResetRequest,
    ) -> Result<(), SubmissionError> {
        self.post(&["auth", "password-reset", "request"], request)
            .await
            .map(drop)
    }

    async fn confirm_password_reset(
        &self,
        request: &PasswordResetConfirm,
    ) -> Result<(), SubmissionError> {
        self.post(&["auth", "password-reset", "confirm"], request)
            .await
            .map(drop)
    }

    async fn submit_application(
        &self,
        application: &Application,
    ) -> Result<Applicant, SubmissionError> {
        let body = self.post(&["applications"], application).await?;
        let applicant: Applicant =
            decode_value(body).map_err(|error| SubmissionError::decode(error.to_string()))?;
        applicant.verify().map_err(SubmissionError::decode)?;
        Ok(applicant)
    }

    async fn update_settings(&self, update: &SettingsUpdate) -> Result<(), SubmissionError> {
        self.call(Method::PUT, &["settings"], update).await.map(drop)
    }

    async fn submit_testimonial(&self, testimonial: &Testimonial) -> Result<(), SubmissionError> {
        self.post(&["testimonials"], testimonial).await.map(drop)
    }

    async fn submit_help_request(&self, request: &HelpRequest) -> Result<(), SubmissionError> {
        self.post(&["help"], request).await.map(drop)
    }

    async fn submit_contact(&self, contact: &Contact) -> Result<(), SubmissionError> {
        self.post(&["contact"], contact).await.map(drop)
    }
}
