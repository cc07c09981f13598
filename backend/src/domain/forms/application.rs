//! Membership application form.

use serde::{Deserialize, Serialize};
use url::Url;
use utoipa::ToSchema;

use super::Schema;
use crate::domain::validation::{Issues, Validator};

const MOTIVATION_MIN: usize = 50;
const MOTIVATION_MAX: usize = 2000;
const SPECIALIZATION_MAX: usize = 100;

/// Raw application submission. Field names follow the API's snake_case.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct ApplicationInput {
    /// Applicant's user id.
    pub user_id: Option<String>,
    /// Profile photo URL.
    pub profile_photo_url: Option<String>,
    /// Why the applicant wants to join.
    pub motivation_letter: Option<String>,
    /// Member who referred the applicant.
    pub referred_by_member_id: Option<String>,
    /// Declared specialization.
    pub specialization_area: Option<String>,
    /// CV URL.
    pub resume_url: Option<String>,
}

/// Validated membership application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Application {
    user_id: String,
    profile_photo_url: Url,
    motivation_letter: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    referred_by_member_id: Option<String>,
    specialization_area: String,
    resume_url: Url,
}

impl Application {
    /// Applicant's user id.
    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// Declared specialization.
    pub fn specialization_area(&self) -> &str {
        &self.specialization_area
    }
}

impl Schema for Application {
    type Input = ApplicationInput;

    fn validate(input: ApplicationInput) -> Result<Self, Issues> {
        let mut v = Validator::new();
        let user_id = v.required("user_id", input.user_id);
        let profile_photo_url = v
            .required("profile_photo_url", input.profile_photo_url)
            .and_then(|u| v.url("profile_photo_url", u));
        let motivation_letter = v
            .required("motivation_letter", input.motivation_letter)
            .and_then(|m| v.length("motivation_letter", m, MOTIVATION_MIN, MOTIVATION_MAX));
        let referred_by_member_id = Validator::optional(input.referred_by_member_id);
        let specialization_area = v
            .required("specialization_area", input.specialization_area)
            .and_then(|s| v.length("specialization_area", s, 1, SPECIALIZATION_MAX));
        let resume_url = v
            .required("resume_url", input.resume_url)
            .and_then(|u| v.url("resume_url", u));
        v.finish(|| {
            Some(Self {
                user_id: user_id?,
                profile_photo_url: profile_photo_url?,
                motivation_letter: motivation_letter?,
                referred_by_member_id,
                specialization_area: specialization_area?,
                resume_url: resume_url?,
            })
        })
    }
}
