//! Testimonial and review form.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{Schema, wire_enum};
use crate::domain::validation::{Issues, Validator};

wire_enum! {
    /// Whether the feedback is a general testimonial or a review of a
    /// specific service or event.
    pub enum TestimonialKind {
        Testimonial => "testimonial",
        Review => "review",
    }
}

/// Raw testimonial submission.
///
/// `rating` is kept as a JSON number so fractional or out-of-range values
/// reach the range check instead of failing to decode.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TestimonialInput {
    /// Testimonial target: service or event.
    #[serde(rename = "type")]
    pub kind: Option<String>,
    /// Rating from 1 to 5.
    #[schema(value_type = Option<f64>)]
    pub rating: Option<serde_json::Number>,
    /// Free-text comment.
    pub comment: Option<String>,
    /// Reviewed service.
    pub service_id: Option<String>,
    /// Reviewed event.
    pub event_id: Option<String>,
}

/// Validated testimonial.
///
/// At most one of `serviceId`/`eventId` is expected but this is not
/// enforced; the API decides which target wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Testimonial {
    #[serde(rename = "type")]
    kind: TestimonialKind,
    rating: u8,
    comment: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    service_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    event_id: Option<String>,
}

impl Testimonial {
    /// Testimonial target.
    pub fn kind(&self) -> TestimonialKind {
        self.kind
    }

    /// Rating from 1 to 5.
    pub fn rating(&self) -> u8 {
        self.rating
    }
}

fn rating(v: &mut Validator, raw: Option<serde_json::Number>) -> Option<u8> {
    let Some(number) = raw else {
        v.fail("rating", "Rating is required");
        return None;
    };
    match number.as_u64().and_then(|n| u8::try_from(n).ok()) {
        Some(value @ 1..=5) => Some(value),
        _ => {
            v.fail("rating", "Rating must be a whole number between 1 and 5");
            None
        }
    }
}

impl Schema for Testimonial {
    type Input = TestimonialInput;

    fn validate(input: TestimonialInput) -> Result<Self, Issues> {
        let mut v = Validator::new();
        let kind = v
            .required("type", input.kind)
            .and_then(|k| v.one_of::<TestimonialKind>("type", k, TestimonialKind::VALUES));
        let rating = rating(&mut v, input.rating);
        let comment = v
            .required("comment", input.comment)
            .and_then(|c| v.length("comment", c, 10, 500));
        v.finish(|| {
            Some(Self {
                kind: kind?,
                rating: rating?,
                comment: comment?,
                service_id: Validator::optional(input.service_id),
                event_id: Validator::optional(input.event_id),
            })
        })
    }
}
