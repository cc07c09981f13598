//! Authentication API handlers.
//!
//! ```text
//! POST /api/v1/auth/sign-in {"email":"ada@example.com","password":"..."}
//! POST /api/v1/auth/sign-up {"name":"Ada","email":"...","password":"...","type":"individual","category":"engineering"}
//! POST /api/v1/auth/sign-out
//! POST /api/v1/auth/password-reset/request {"email":"ada@example.com"}
//! POST /api/v1/auth/password-reset/confirm {"token":"...","password":"...","confirmPassword":"..."}
//! ```

use actix_web::{HttpResponse, post, web};
use serde_json::Value;
use tracing::debug;

use crate::domain::forms::{
    PasswordResetConfirmInput, PasswordResetRequestInput, SignInInput, SignUpInput,
};
use crate::domain::{Error, SignedInMember};
use crate::inbound::http::ApiResult;
use crate::inbound::http::cache_control::private_no_cache_header;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Replace whatever the cookie held with `member` and a fresh store.
fn establish_session(
    state: &HttpState,
    session: &SessionContext,
    member: &SignedInMember,
) -> ApiResult<HttpResponse> {
    if let Some(previous) = session.store_key() {
        state.stores.remove(&previous);
    }
    session.sign_in(member)?;
    debug!(member = %member.id, "session established");
    Ok(HttpResponse::Ok()
        .insert_header(private_no_cache_header())
        .json(member))
}

/// Check credentials with the membership service and start a session.
#[utoipa::path(
    post,
    path = "/api/v1/auth/sign-in",
    request_body = SignInInput,
    responses(
        (status = 200, description = "Signed in", body = SignedInMember,
            headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Malformed body", body = Error),
        (status = 401, description = "Rejected credentials", body = Error),
        (status = 422, description = "Invalid fields", body = Error),
        (status = 502, description = "Membership service unavailable", body = Error)
    ),
    tags = ["auth"],
    operation_id = "signIn",
    security([])
)]
#[post("/auth/sign-in")]
pub async fn sign_in(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<Value>,
) -> ApiResult<HttpResponse> {
    let member = state.submissions.sign_in(payload.into_inner()).await?;
    establish_session(&state, &session, &member)
}

/// Register an account and sign it in.
#[utoipa::path(
    post,
    path = "/api/v1/auth/sign-up",
    request_body = SignUpInput,
    responses(
        (status = 200, description = "Account created and signed in", body = SignedInMember),
        (status = 400, description = "Rejected by the membership service", body = Error),
        (status = 422, description = "Invalid fields", body = Error),
        (status = 502, description = "Membership service unavailable", body = Error)
    ),
    tags = ["auth"],
    operation_id = "signUp",
    security([])
)]
#[post("/auth/sign-up")]
pub async fn sign_up(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<Value>,
) -> ApiResult<HttpResponse> {
    let member = state.submissions.sign_up(payload.into_inner()).await?;
    establish_session(&state, &session, &member)
}

/// End the session and drop its slice store.
#[utoipa::path(
    post,
    path = "/api/v1/auth/sign-out",
    responses((status = 204, description = "Signed out")),
    tags = ["auth"],
    operation_id = "signOut",
    security([])
)]
#[post("/auth/sign-out")]
pub async fn sign_out(state: web::Data<HttpState>, session: SessionContext) -> HttpResponse {
    if let Some(key) = session.sign_out() {
        state.stores.remove(&key);
    }
    HttpResponse::NoContent()
        .insert_header(private_no_cache_header())
        .finish()
}

/// Ask for a reset code by e-mail or SMS.
#[utoipa::path(
    post,
    path = "/api/v1/auth/password-reset/request",
    request_body = PasswordResetRequestInput,
    responses(
        (status = 204, description = "Reset requested"),
        (status = 422, description = "Neither email nor phone given", body = Error),
        (status = 502, description = "Membership service unavailable", body = Error)
    ),
    tags = ["auth"],
    operation_id = "requestPasswordReset",
    security([])
)]
#[post("/auth/password-reset/request")]
pub async fn request_password_reset(
    state: web::Data<HttpState>,
    payload: web::Json<Value>,
) -> ApiResult<HttpResponse> {
    state
        .submissions
        .request_password_reset(payload.into_inner())
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Set a new password with a reset token.
#[utoipa::path(
    post,
    path = "/api/v1/auth/password-reset/confirm",
    request_body = PasswordResetConfirmInput,
    responses(
        (status = 204, description = "Password changed"),
        (status = 400, description = "Token rejected", body = Error),
        (status = 422, description = "Invalid fields", body = Error),
        (status = 502, description = "Membership service unavailable", body = Error)
    ),
    tags = ["auth"],
    operation_id = "confirmPasswordReset",
    security([])
)]
#[post("/auth/password-reset/confirm")]
pub async fn confirm_password_reset(
    state: web::Data<HttpState>,
    payload: web::Json<Value>,
) -> ApiResult<HttpResponse> {
    state
        .submissions
        .confirm_password_reset(payload.into_inner())
        .await?;
    Ok(HttpResponse::NoContent().finish())
}
