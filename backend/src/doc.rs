//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] describes the `/api/v1` JSON surface and the health probes.
//! The HTML pages are not part of the document. Swagger UI serves it in
//! debug builds.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::content::{Applicant, Member};
use crate::domain::forms::{
    ApplicationInput, AttachmentInput, ContactInput, HelpRequestInput, PasswordResetConfirmInput,
    PasswordResetRequestInput, SettingsUpdateInput, SignInInput, SignUpInput, TestimonialInput,
};
use crate::domain::{Error, ErrorCode, Issue, MemberRole, SignedInMember, UploadStatus};
use crate::inbound::http::profile::{ApplicantSlice, MembersSlice, ProfileState};

/// Enrich the generated document with the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie issued by POST /api/v1/auth/sign-in.",
            ))),
        );
    }
}

/// OpenAPI document for the portal API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Membership portal API",
        description = "Session-authenticated forms, profile state and uploads backed by the membership service."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::auth::sign_in,
        crate::inbound::http::auth::sign_up,
        crate::inbound::http::auth::sign_out,
        crate::inbound::http::auth::request_password_reset,
        crate::inbound::http::auth::confirm_password_reset,
        crate::inbound::http::forms::submit_application,
        crate::inbound::http::forms::update_settings,
        crate::inbound::http::forms::submit_testimonial,
        crate::inbound::http::forms::submit_help_request,
        crate::inbound::http::forms::submit_contact,
        crate::inbound::http::profile::profile_state,
        crate::inbound::http::profile::members_state,
        crate::inbound::http::uploads::upload_file,
        crate::inbound::http::uploads::upload_status,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        Error,
        ErrorCode,
        Issue,
        SignedInMember,
        MemberRole,
        Applicant,
        Member,
        UploadStatus,
        ProfileState,
        ApplicantSlice,
        MembersSlice,
        SignInInput,
        SignUpInput,
        PasswordResetRequestInput,
        PasswordResetConfirmInput,
        ApplicationInput,
        SettingsUpdateInput,
        TestimonialInput,
        HelpRequestInput,
        AttachmentInput,
        ContactInput,
    )),
    tags(
        (name = "auth", description = "Sign-in, sign-up and password reset"),
        (name = "forms", description = "Validated form submissions"),
        (name = "profile", description = "Per-session profile and member state"),
        (name = "uploads", description = "Document uploads"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
