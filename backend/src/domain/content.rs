//! Read-only content served by the remote API.
//!
//! Every type here is decoded from an upstream response and then checked
//! with [`Verify`] before any page sees it, so a shape mismatch becomes an
//! explicit error instead of a half-rendered page.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::forms::wire_enum;

/// Shape check applied to decoded upstream payloads.
pub trait Verify {
    /// Return a description of the first violated invariant.
    ///
    /// # Errors
    /// Returns a message naming the offending field.
    fn verify(&self) -> Result<(), String>;
}

impl<T: Verify> Verify for Vec<T> {
    fn verify(&self) -> Result<(), String> {
        self.iter()
            .enumerate()
            .try_for_each(|(index, item)| item.verify().map_err(|error| format!("[{index}] {error}")))
    }
}

fn non_blank(field: &str, value: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        Err(format!("{field} must not be empty"))
    } else {
        Ok(())
    }
}

/// One entry of the FAQ list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Faq {
    /// Stable identifier.
    #[serde(alias = "_id")]
    pub id: String,
    /// Question text.
    pub question: String,
    /// Answer text.
    pub answer: String,
    /// Grouping label.
    #[serde(default = "default_faq_category")]
    pub category: String,
    /// Creation time.
    #[serde(default, alias = "created_at")]
    pub created_at: Option<DateTime<Utc>>,
    /// Last edit time.
    #[serde(default, alias = "updated_at")]
    pub updated_at: Option<DateTime<Utc>>,
}

fn default_faq_category() -> String {
    "general".to_owned()
}

impl Verify for Faq {
    fn verify(&self) -> Result<(), String> {
        non_blank("id", &self.id)?;
        non_blank("question", &self.question)?;
        non_blank("answer", &self.answer)
    }
}

/// FAQs sharing a category, in upstream order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FaqGroup {
    /// Category label.
    pub category: String,
    /// Entries in upstream order.
    pub entries: Vec<Faq>,
}

/// Group FAQs by category, keeping the order in which categories first
/// appear.
///
/// # Examples
/// ```
/// use portal::domain::content::{Faq, group_faqs};
///
/// let faq = |id: &str, category: &str| Faq {
///     id: id.into(),
///     question: "Q?".into(),
///     answer: "A.".into(),
///     category: category.into(),
///     created_at: None,
///     updated_at: None,
/// };
/// let groups = group_faqs(vec![faq("1", "events"), faq("2", "billing"), faq("3", "events")]);
/// assert_eq!(groups.len(), 2);
/// assert_eq!(groups[0].category, "events");
/// assert_eq!(groups[0].entries.len(), 2);
/// ```
#[must_use]
pub fn group_faqs(faqs: Vec<Faq>) -> Vec<FaqGroup> {
    let mut groups: Vec<FaqGroup> = Vec::new();
    for faq in faqs {
        match groups.iter_mut().find(|group| group.category == faq.category) {
            Some(group) => group.entries.push(faq),
            None => groups.push(FaqGroup {
                category: faq.category.clone(),
                entries: vec![faq],
            }),
        }
    }
    groups
}

/// A person shown on the about page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TeamMember {
    /// Full name.
    pub name: String,
    /// Position in the team.
    #[serde(default)]
    pub role: String,
    /// Portrait URL.
    #[serde(default, alias = "photo_url")]
    pub photo_url: Option<String>,
}

/// About page content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AboutPage {
    /// Page heading.
    pub title: String,
    /// Mission statement.
    pub mission: String,
    /// Vision statement.
    #[serde(default)]
    pub vision: Option<String>,
    /// Longer history.
    #[serde(default)]
    pub story: Option<String>,
    /// Team members in display order.
    #[serde(default)]
    pub team: Vec<TeamMember>,
}

impl Verify for AboutPage {
    fn verify(&self) -> Result<(), String> {
        non_blank("title", &self.title)?;
        non_blank("mission", &self.mission)?;
        self.team
            .iter()
            .try_for_each(|member| non_blank("team.name", &member.name))
    }
}

/// Blog post summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BlogPost {
    /// Stable identifier.
    #[serde(alias = "_id")]
    pub id: String,
    /// Post title.
    pub title: String,
    /// URL slug.
    #[serde(default)]
    pub slug: String,
    /// Short summary.
    #[serde(default)]
    pub excerpt: Option<String>,
    /// Author name.
    #[serde(default)]
    pub author: Option<String>,
    /// Publication time.
    #[serde(default, alias = "published_at")]
    pub published_at: Option<DateTime<Utc>>,
    /// Cover image URL.
    #[serde(default, alias = "cover_image_url")]
    pub cover_image_url: Option<String>,
}

impl Verify for BlogPost {
    fn verify(&self) -> Result<(), String> {
        non_blank("id", &self.id)?;
        non_blank("title", &self.title)
    }
}

/// Project card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    /// Stable identifier.
    #[serde(alias = "_id")]
    pub id: String,
    /// Project name.
    pub title: String,
    /// Project summary.
    #[serde(default)]
    pub description: String,
    /// Free-form progress label.
    #[serde(default)]
    pub status: Option<String>,
    /// Illustration URL.
    #[serde(default, alias = "image_url")]
    pub image_url: Option<String>,
}

impl Verify for Project {
    fn verify(&self) -> Result<(), String> {
        non_blank("id", &self.id)?;
        non_blank("title", &self.title)
    }
}

/// Upcoming or past event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    /// Stable identifier.
    #[serde(alias = "_id")]
    pub id: String,
    /// Event name.
    pub title: String,
    /// Event summary.
    #[serde(default)]
    pub description: Option<String>,
    /// Venue or link.
    #[serde(default)]
    pub location: Option<String>,
    /// Start time.
    #[serde(alias = "starts_at", alias = "date")]
    pub starts_at: DateTime<Utc>,
    /// End time.
    #[serde(default, alias = "ends_at")]
    pub ends_at: Option<DateTime<Utc>>,
}

impl Verify for Event {
    fn verify(&self) -> Result<(), String> {
        non_blank("id", &self.id)?;
        non_blank("title", &self.title)?;
        match self.ends_at {
            Some(ends_at) if ends_at < self.starts_at => {
                Err("endsAt must not precede startsAt".to_owned())
            }
            _ => Ok(()),
        }
    }
}

/// Member as listed in the admin area.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    /// Stable identifier.
    #[serde(alias = "_id")]
    pub id: String,
    /// Display name.
    pub name: String,
    /// Contact email.
    pub email: String,
    /// Membership category.
    #[serde(default)]
    pub category: Option<String>,
    /// Join date.
    #[serde(default, alias = "joined_at", alias = "createdAt")]
    pub joined_at: Option<DateTime<Utc>>,
}

impl Verify for Member {
    fn verify(&self) -> Result<(), String> {
        non_blank("id", &self.id)?;
        non_blank("name", &self.name)?;
        if self.email.contains('@') {
            Ok(())
        } else {
            Err("email must contain '@'".to_owned())
        }
    }
}

wire_enum! {
    /// Review state of a membership application.
    pub enum ApplicationStatus {
        Pending => "pending",
        Approved => "approved",
        Rejected => "rejected",
    }
}

/// The signed-in member's application, as shown on the profile page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Applicant {
    /// Application identifier.
    #[serde(alias = "_id")]
    pub id: String,
    /// Applicant's user id.
    pub user_id: String,
    /// Review status.
    pub status: ApplicationStatus,
    /// Declared specialization.
    pub specialization_area: String,
    /// Submission time.
    #[serde(default)]
    pub submitted_at: Option<DateTime<Utc>>,
}

impl Verify for Applicant {
    fn verify(&self) -> Result<(), String> {
        non_blank("id", &self.id)?;
        non_blank("user_id", &self.user_id)
    }
}

#[cfg(test)]
mod tests {
    //! Decoding and shape checks for upstream content.
    use super::*;
    use serde_json::json;

    #[test]
    fn faq_accepts_snake_case_timestamps_and_mongo_ids() {
        let faq: Faq = serde_json::from_value(json!({
            "_id": "f1",
            "question": "Who can join?",
            "answer": "Anyone over 16.",
            "category": "membership",
            "created_at": "2024-05-01T10:00:00Z"
        }))
        .expect("decode faq");
        assert_eq!(faq.id, "f1");
        assert!(faq.created_at.is_some());
        assert!(faq.verify().is_ok());
    }

    #[test]
    fn blank_answers_fail_verification_with_index() {
        let faqs: Vec<Faq> = serde_json::from_value(json!([
            { "id": "1", "question": "Q1", "answer": "A1" },
            { "id": "2", "question": "Q2", "answer": " " }
        ]))
        .expect("decode faqs");
        assert_eq!(faqs.verify(), Err("[1] answer must not be empty".to_owned()));
    }

    #[test]
    fn events_must_not_end_before_they_start() {
        let event: Event = serde_json::from_value(json!({
            "id": "e1",
            "title": "Hack night",
            "date": "2024-06-01T18:00:00Z",
            "endsAt": "2024-06-01T17:00:00Z"
        }))
        .expect("decode event");
        assert!(event.verify().is_err());
    }

    #[test]
    fn applicant_status_decodes_wire_values() {
        let applicant: Applicant = serde_json::from_value(json!({
            "id": "a1",
            "user_id": "m1",
            "status": "approved",
            "specialization_area": "Design"
        }))
        .expect("decode applicant");
        assert_eq!(applicant.status, ApplicationStatus::Approved);
    }

    #[test]
    fn members_need_an_email_address() {
        let member = Member {
            id: "m1".into(),
            name: "Ada".into(),
            email: "ada.example.org".into(),
            category: None,
            joined_at: None,
        };
        assert!(member.verify().is_err());
    }
}
