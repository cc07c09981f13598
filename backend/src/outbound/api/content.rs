//! Remote content adapter.
//!
//! Every payload is decoded and then shape-checked with [`Verify`] before it
//! leaves the adapter.

use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;

use super::client::{ApiClient, ApiClientError};
use crate::domain::content::{AboutPage, Applicant, BlogPost, Event, Faq, Member, Project, Verify};
use crate::domain::ports::{ContentSource, ContentSourceError};

/// [`ContentSource`] backed by the remote REST API.
#[derive(Debug, Clone)]
pub struct HttpContentSource {
    client: Arc<ApiClient>,
}

impl HttpContentSource {
    /// Content source reading through `client`.
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    async fn fetch_verified<T>(&self, segments: &[&str]) -> Result<T, ContentSourceError>
    where
        T: DeserializeOwned + Verify,
    {
        let payload: T = self
            .client
            .get_json(segments)
            .await
            .map_err(map_client_error)?;
        payload.verify().map_err(|message| {
            ContentSourceError::decode(format!("/{}: {message}", segments.join("/")))
        })?;
        Ok(payload)
    }
}

fn map_client_error(error: ApiClientError) -> ContentSourceError {
    match error {
        ApiClientError::Url { message } | ApiClientError::Transport { message, .. } => {
            ContentSourceError::transport(message)
        }
        ApiClientError::Status { status, message } => ContentSourceError::status(status, message),
        ApiClientError::Decode { message } => ContentSourceError::decode(message),
    }
}

#[async_trait]
impl ContentSource for HttpContentSource {
    async fn fetch_about_data(&self) -> Result<AboutPage, ContentSourceError> {
        self.fetch_verified(&["about"]).await
    }

    async fn fetch_faqs(&self) -> Result<Vec<Faq>, ContentSourceError> {
        self.fetch_verified(&["about", "faqs"]).await
    }

    async fn fetch_blogs(&self) -> Result<Vec<BlogPost>, ContentSourceError> {
        self.fetch_verified(&["blogs"]).await
    }

    async fn fetch_projects_data(&self) -> Result<Vec<Project>, ContentSourceError> {
        self.fetch_verified(&["projects"]).await
    }

    async fn fetch_events(&self) -> Result<Vec<Event>, ContentSourceError> {
        self.fetch_verified(&["events"]).await
    }

    async fn fetch_members(&self) -> Result<Vec<Member>, ContentSourceError> {
        self.fetch_verified(&["auth", "members"]).await
    }

    async fn fetch_applicant(
        &self,
        user_id: &str,
    ) -> Result<Option<Applicant>, ContentSourceError> {
        match self.fetch_verified(&["applications", user_id]).await {
            Ok(applicant) => Ok(Some(applicant)),
            Err(ContentSourceError::Status { status: 404, .. }) => Ok(None),
            Err(error) => Err(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(ApiClientError::Url { message: "bad".into() }, "Transport")]
    #[case(ApiClientError::Transport { message: "refused".into(), timed_out: false }, "Transport")]
    #[case(ApiClientError::Status { status: 500, message: "boom".into() }, "Status")]
    #[case(ApiClientError::Decode { message: "eof".into() }, "Decode")]
    fn client_errors_map_onto_port_errors(#[case] error: ApiClientError, #[case] expected: &str) {
        let mapped = map_client_error(error);
        let variant = match mapped {
            ContentSourceError::Transport { .. } => "Transport",
            ContentSourceError::Status { .. } => "Status",
            ContentSourceError::Decode { .. } => "Decode",
        };
        assert_eq!(variant, expected);
    }
}
