//! Help request form with an optional attachment.
//!
//! Attachments are checked by metadata only (declared size and content
//! type); the bytes themselves travel through the upload tracker.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{Schema, wire_enum};
use crate::domain::validation::{Issues, Validator};

/// Largest accepted attachment: 5 MiB.
pub const MAX_ATTACHMENT_BYTES: u64 = 5 * 1024 * 1024;

const ACCEPTED_CONTENT_TYPES: &[&str] = &["image/png", "image/jpeg", "application/pdf"];

wire_enum! {
    /// Topic of a help request.
    pub enum HelpSubject {
        Account => "account",
        Billing => "billing",
        Technical => "technical",
        Membership => "membership",
        Other => "other",
    }
}

/// Raw attachment metadata.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AttachmentInput {
    /// Original file name.
    pub file_name: Option<String>,
    /// Declared MIME type.
    pub content_type: Option<String>,
    /// Size in bytes.
    pub size: Option<u64>,
    /// Where the file was uploaded.
    pub url: Option<String>,
}

/// Validated attachment metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    file_name: String,
    content_type: String,
    size: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    url: Option<String>,
}

impl Attachment {
    /// Check a declared size and content type against the attachment rules.
    ///
    /// Shared with the upload endpoint so uploads and help forms agree.
    ///
    /// # Errors
    /// Returns the issues recorded under `path`.
    pub fn check(path: &str, content_type: &str, size: u64) -> Result<(), Issues> {
        let mut v = Validator::new();
        check_metadata(&mut v, path, content_type, size);
        v.finish(|| Some(()))
    }

    /// Declared MIME type.
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// Size in bytes.
    pub fn size(&self) -> u64 {
        self.size
    }
}

fn check_metadata(v: &mut Validator, path: &str, content_type: &str, size: u64) -> bool {
    let mut ok = true;
    if size > MAX_ATTACHMENT_BYTES {
        v.fail(path, "Max file size is 5MB");
        ok = false;
    }
    if !ACCEPTED_CONTENT_TYPES.contains(&content_type) {
        v.fail(path, "Only .png, .jpeg and .pdf files are accepted");
        ok = false;
    }
    ok
}

fn validate_attachment(v: &mut Validator, input: AttachmentInput) -> Option<Attachment> {
    let file_name = v.required("attachment.fileName", input.file_name);
    let content_type = v.required("attachment.contentType", input.content_type);
    let Some(size) = input.size else {
        v.fail("attachment.size", "Attachment size is required");
        return None;
    };
    let content_type = content_type?.to_ascii_lowercase();
    if !check_metadata(v, "attachment", &content_type, size) {
        return None;
    }
    Some(Attachment {
        file_name: file_name?,
        content_type,
        size,
        url: Validator::optional(input.url),
    })
}

/// Raw help request.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct HelpRequestInput {
    /// Request category.
    pub subject: Option<String>,
    /// What the member needs help with.
    pub description: Option<String>,
    /// Optional supporting document.
    pub attachment: Option<AttachmentInput>,
}

/// Validated help request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HelpRequest {
    subject: HelpSubject,
    description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    attachment: Option<Attachment>,
}

impl HelpRequest {
    /// Request category.
    pub fn subject(&self) -> HelpSubject {
        self.subject
    }

    /// Supporting document, if attached.
    pub fn attachment(&self) -> Option<&Attachment> {
        self.attachment.as_ref()
    }
}

impl Schema for HelpRequest {
    type Input = HelpRequestInput;

    fn validate(input: HelpRequestInput) -> Result<Self, Issues> {
        let mut v = Validator::new();
        let subject = v
            .required("subject", input.subject)
            .and_then(|s| v.one_of::<HelpSubject>("subject", s, HelpSubject::VALUES));
        let description = v
            .required("description", input.description)
            .and_then(|d| v.length("description", d, 10, 1000));
        let attachment = input.attachment.map(|a| validate_attachment(&mut v, a));
        v.finish(|| {
            Some(Self {
                subject: subject?,
                description: description?,
                attachment: attachment.map_or(Some(None), |a| a.map(Some))?,
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    fn with_attachment(content_type: &str, size: u64) -> serde_json::Value {
        json!({
            "subject": "technical",
            "description": "The upload button does nothing.",
            "attachment": { "fileName": "screen.png", "contentType": content_type, "size": size }
        })
    }

    #[test]
    fn attachment_is_optional() {
        let help = HelpRequest::parse_json(json!({
            "subject": "billing",
            "description": "I was charged twice this month."
        }))
        .expect("valid help request");
        assert_eq!(help.subject(), HelpSubject::Billing);
        assert!(help.attachment().is_none());
    }

    #[rstest]
    #[case("image/png", MAX_ATTACHMENT_BYTES, true)]
    #[case("IMAGE/JPEG", 1024, true)]
    #[case("application/pdf", 10, true)]
    #[case("image/gif", 10, false)]
    #[case("image/png", MAX_ATTACHMENT_BYTES + 1, false)]
    fn attachment_rules(#[case] content_type: &str, #[case] size: u64, #[case] ok: bool) {
        let result = HelpRequest::parse_json(with_attachment(content_type, size));
        assert_eq!(result.is_ok(), ok);
        if let Err(issues) = result {
            assert!(issues.has_field("attachment"));
        }
    }

    #[test]
    fn oversize_gif_reports_both_problems() {
        let issues = HelpRequest::parse_json(with_attachment("image/gif", MAX_ATTACHMENT_BYTES * 2))
            .expect_err("invalid attachment");
        assert_eq!(issues.for_field("attachment").count(), 2);
    }

    #[test]
    fn shared_check_matches_form_rules() {
        assert!(Attachment::check("file", "application/pdf", 2048).is_ok());
        let issues = Attachment::check("file", "text/plain", 2048).expect_err("text rejected");
        assert!(issues.has_field("file"));
    }

    #[test]
    fn short_description_and_unknown_subject() {
        let issues = HelpRequest::parse_json(json!({ "subject": "rant", "description": "help" }))
            .expect_err("invalid");
        assert!(issues.has_field("subject"));
        assert!(issues.has_field("description"));
    }
}
