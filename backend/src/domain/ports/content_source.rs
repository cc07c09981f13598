//! Read-side port for content owned by the remote API.

use async_trait::async_trait;

use crate::domain::content::{AboutPage, Applicant, BlogPost, Event, Faq, Member, Project};

use super::define_port_error;

define_port_error! {
    /// Errors raised when fetching content.
    pub enum ContentSourceError {
        /// The API could not be reached or the connection failed mid-response.
        Transport { message: String } =>
            "could not reach the content service: {message}",
        /// The API answered with a non-success status.
        Status { status: u16, message: String } =>
            "content service returned {status}: {message}",
        /// The body did not decode or failed its shape check.
        Decode { message: String } =>
            "content service sent an unexpected response: {message}",
    }
}

/// One fetch per resource. Every method issues a single GET and verifies
/// the response shape before returning it.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// `GET /about`
    async fn fetch_about_data(&self) -> Result<AboutPage, ContentSourceError>;

    /// `GET /about/faqs`
    async fn fetch_faqs(&self) -> Result<Vec<Faq>, ContentSourceError>;

    /// `GET /blogs`
    async fn fetch_blogs(&self) -> Result<Vec<BlogPost>, ContentSourceError>;

    /// `GET /projects`
    async fn fetch_projects_data(&self) -> Result<Vec<Project>, ContentSourceError>;

    /// `GET /events`
    async fn fetch_events(&self) -> Result<Vec<Event>, ContentSourceError>;

    /// `GET /auth/members`
    async fn fetch_members(&self) -> Result<Vec<Member>, ContentSourceError>;

    /// `GET /applications/{user_id}`; `None` when the member has not applied.
    async fn fetch_applicant(&self, user_id: &str)
    -> Result<Option<Applicant>, ContentSourceError>;
}

/// Fixture implementation serving a small, fixed catalogue.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureContentSource;

#[async_trait]
impl ContentSource for FixtureContentSource {
    async fn fetch_about_data(&self) -> Result<AboutPage, ContentSourceError> {
        Ok(AboutPage {
            title: "About us".to_owned(),
            mission: "Connecting practitioners through events and projects.".to_owned(),
            vision: None,
            story: None,
            team: Vec::new(),
        })
    }

    async fn fetch_faqs(&self) -> Result<Vec<Faq>, ContentSourceError> {
        Ok(vec![Faq {
            id: "faq-1".to_owned(),
            question: "Who can join?".to_owned(),
            answer: "Anyone who shares our mission.".to_owned(),
            category: "membership".to_owned(),
            created_at: None,
            updated_at: None,
        }])
    }

    async fn fetch_blogs(&self) -> Result<Vec<BlogPost>, ContentSourceError> {
        Ok(Vec::new())
    }

    async fn fetch_projects_data(&self) -> Result<Vec<Project>, ContentSourceError> {
        Ok(Vec::new())
    }

    async fn fetch_events(&self) -> Result<Vec<Event>, ContentSourceError> {
        Ok(Vec::new())
    }

    async fn fetch_members(&self) -> Result<Vec<Member>, ContentSourceError> {
        Ok(Vec::new())
    }

    async fn fetch_applicant(
        &self,
        _user_id: &str,
    ) -> Result<Option<Applicant>, ContentSourceError> {
        Ok(None)
    }
}
