//! Form submission API handlers.
//!
//! ```text
//! POST /api/v1/applications   (session)
//! PUT  /api/v1/settings       (session)
//! POST /api/v1/testimonials   (session)
//! POST /api/v1/help
//! POST /api/v1/contact
//! ```
//!
//! Bodies are taken as raw JSON so every field problem is reported through
//! the schema as a 422 issue rather than a decoder error.

use actix_web::{HttpResponse, post, put, web};
use serde_json::Value;

use crate::domain::content::Applicant;
use crate::domain::forms::{
    ApplicationInput, ContactInput, HelpRequestInput, SettingsUpdateInput, TestimonialInput,
};
use crate::domain::Error;
use crate::inbound::http::ApiResult;
use crate::inbound::http::cache_control::private_no_cache_header;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Submit a membership application for the signed-in member.
///
/// The accepted application is kept in the session's applicant slice so the
/// profile page shows it without refetching.
#[utoipa::path(
    post,
    path = "/api/v1/applications",
    request_body = ApplicationInput,
    responses(
        (status = 201, description = "Application accepted", body = Applicant),
        (status = 401, description = "Sign-in required", body = Error),
        (status = 403, description = "user_id names another member", body = Error),
        (status = 422, description = "Invalid fields", body = Error),
        (status = 502, description = "Membership service unavailable", body = Error)
    ),
    tags = ["forms"],
    operation_id = "submitApplication"
)]
#[post("/applications")]
pub async fn submit_application(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<Value>,
) -> ApiResult<HttpResponse> {
    let member = session.require_member()?;
    let applicant = state
        .submissions
        .submit_application(&member, payload.into_inner())
        .await?;
    state.store_for(&session)?.store_applicant(applicant.clone());
    Ok(HttpResponse::Created()
        .insert_header(private_no_cache_header())
        .json(applicant))
}

/// Change one account setting.
#[utoipa::path(
    put,
    path = "/api/v1/settings",
    request_body = SettingsUpdateInput,
    responses(
        (status = 200, description = "Setting saved; echoes the normalised update"),
        (status = 401, description = "Sign-in required", body = Error),
        (status = 403, description = "user_id names another member", body = Error),
        (status = 422, description = "Invalid fields", body = Error),
        (status = 502, description = "Membership service unavailable", body = Error)
    ),
    tags = ["forms"],
    operation_id = "updateSettings"
)]
#[put("/settings")]
pub async fn update_settings(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<Value>,
) -> ApiResult<HttpResponse> {
    let member = session.require_member()?;
    let update = state
        .submissions
        .update_settings(&member, payload.into_inner())
        .await?;
    Ok(HttpResponse::Ok()
        .insert_header(private_no_cache_header())
        .json(update))
}

/// Leave a testimonial or review.
#[utoipa::path(
    post,
    path = "/api/v1/testimonials",
    request_body = TestimonialInput,
    responses(
        (status = 204, description = "Testimonial accepted"),
        (status = 401, description = "Sign-in required", body = Error),
        (status = 422, description = "Invalid fields", body = Error),
        (status = 502, description = "Membership service unavailable", body = Error)
    ),
    tags = ["forms"],
    operation_id = "submitTestimonial"
)]
#[post("/testimonials")]
pub async fn submit_testimonial(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<Value>,
) -> ApiResult<HttpResponse> {
    session.require_member()?;
    state
        .submissions
        .submit_testimonial(payload.into_inner())
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Validate and forward a help request.
#[utoipa::path(
    post,
    path = "/api/v1/help",
    request_body = HelpRequestInput,
    responses(
        (status = 204, description = "Help request filed"),
        (status = 422, description = "Invalid fields", body = Error),
        (status = 502, description = "Membership service unavailable", body = Error)
    ),
    tags = ["forms"],
    operation_id = "submitHelpRequest",
    security([])
)]
#[post("/help")]
pub async fn submit_help_request(
    state: web::Data<HttpState>,
    payload: web::Json<Value>,
) -> ApiResult<HttpResponse> {
    state
        .submissions
        .submit_help_request(payload.into_inner())
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Validate and forward a contact message.
#[utoipa::path(
    post,
    path = "/api/v1/contact",
    request_body = ContactInput,
    responses(
        (status = 204, description = "Message sent"),
        (status = 422, description = "Invalid fields", body = Error),
        (status = 502, description = "Membership service unavailable", body = Error)
    ),
    tags = ["forms"],
    operation_id = "submitContact",
    security([])
)]
#[post("/contact")]
pub async fn submit_contact(
    state: web::Data<HttpState>,
    payload: web::Json<Value>,
) -> ApiResult<HttpResponse> {
    state.submissions.submit_contact(payload.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}
