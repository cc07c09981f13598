//! Session state API handlers.
//!
//! ```text
//! GET /api/v1/profile         (session)
//! GET /api/v1/admin/members   (admin)
//! ```
//!
//! Both run their slice thunk and answer with the resulting slice snapshot,
//! so a failed fetch is reported inside the body with status 200.

use actix_web::{HttpResponse, get, web};
use serde::Serialize;
use tracing::debug;
use utoipa::ToSchema;

use crate::domain::content::{Applicant, Member};
use crate::domain::slice::SliceState;
use crate::domain::{Error, SignedInMember, UploadStatus};
use crate::inbound::http::ApiResult;
use crate::inbound::http::cache_control::private_no_cache_header;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Applicant slice as seen by clients.
#[derive(Debug, Serialize, ToSchema)]
pub struct ApplicantSlice {
    /// Loaded application, if any.
    pub data: Option<Applicant>,
    /// A load is in flight.
    pub loading: bool,
    /// Message from the last failed load.
    pub error: Option<String>,
}

impl From<SliceState<Option<Applicant>>> for ApplicantSlice {
    fn from(state: SliceState<Option<Applicant>>) -> Self {
        Self {
            data: state.data.flatten(),
            loading: state.loading,
            error: state.error,
        }
    }
}

/// Members slice as seen by clients.
#[derive(Debug, Serialize, ToSchema)]
pub struct MembersSlice {
    /// Loaded directory.
    pub data: Option<Vec<Member>>,
    /// A load is in flight.
    pub loading: bool,
    /// Message from the last failed load.
    pub error: Option<String>,
}

impl From<SliceState<Vec<Member>>> for MembersSlice {
    fn from(state: SliceState<Vec<Member>>) -> Self {
        Self {
            data: state.data,
            loading: state.loading,
            error: state.error,
        }
    }
}

/// Everything the profile page shows for the signed-in member.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfileState {
    /// Signed-in member.
    pub member: SignedInMember,
    /// Application slice.
    pub applicant: ApplicantSlice,
    /// Upload tracker status.
    pub upload: UploadStatus,
}

/// Refresh and return the signed-in member's profile state.
#[utoipa::path(
    get,
    path = "/api/v1/profile",
    responses(
        (status = 200, description = "Profile state", body = ProfileState),
        (status = 401, description = "Sign-in required", body = Error)
    ),
    tags = ["profile"],
    operation_id = "getProfile"
)]
#[get("/profile")]
pub async fn profile_state(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<HttpResponse> {
    let member = session.require_member()?;
    let store = state.store_for(&session)?;
    if let Err(error) = store
        .load_applicant(state.content.as_ref(), &member.id)
        .await
    {
        debug!(%error, "applicant load failed; recorded in slice");
    }

    let body = ProfileState {
        applicant: store.applicant().into(),
        upload: store.upload().status(),
        member,
    };
    Ok(HttpResponse::Ok()
        .insert_header(private_no_cache_header())
        .json(body))
}

/// Refresh and return the member directory.
#[utoipa::path(
    get,
    path = "/api/v1/admin/members",
    responses(
        (status = 200, description = "Members slice", body = MembersSlice),
        (status = 401, description = "Sign-in required", body = Error),
        (status = 403, description = "Admin role required", body = Error)
    ),
    tags = ["profile"],
    operation_id = "listMembers"
)]
#[get("/admin/members")]
pub async fn members_state(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<HttpResponse> {
    session.require_admin()?;
    let store = state.store_for(&session)?;
    if let Err(error) = store.load_members(state.content.as_ref()).await {
        debug!(%error, "members load failed; recorded in slice");
    }

    Ok(HttpResponse::Ok()
        .insert_header(private_no_cache_header())
        .json(MembersSlice::from(store.members())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::MemberRole;
    use crate::domain::ports::{
        ContentSourceError, MockContentSource, MockSubmissionGateway,
    };
    use crate::inbound::http::auth::{sign_in, sign_out};
    use crate::inbound::http::test_utils::{TestPorts, test_session_middleware};
    use actix_web::cookie::Cookie;
    use actix_web::http::StatusCode;
    use actix_web::{App, test};
    use serde_json::{Value, json};
    use std::sync::Arc;

    fn gateway_for(role: MemberRole) -> MockSubmissionGateway {
        let mut gateway = MockSubmissionGateway::new();
        gateway.expect_sign_in().returning(move |_| {
            Ok(SignedInMember {
                id: "user-1".to_owned(),
                display_name: "Ada".to_owned(),
                role,
            })
        });
        gateway
    }

    macro_rules! profile_app {
        ($state:expr) => {
            test::init_service(
                App::new()
                    .wrap(test_session_middleware())
                    .app_data($state)
                    .service(
                        web::scope("/api/v1")
                            .service(sign_in)
                            .service(sign_out)
                            .service(profile_state)
                            .service(members_state),
                    ),
            )
            .await
        };
    }

    async fn signed_in_cookie<S>(app: &S) -> Cookie<'static>
    where
        S: actix_web::dev::Service<
                actix_http::Request,
                Response = actix_web::dev::ServiceResponse,
                Error = actix_web::Error,
            >,
    {
        let res = test::call_service(
            app,
            test::TestRequest::post()
                .uri("/api/v1/auth/sign-in")
                .set_json(json!({ "email": "ada@example.com", "password": "Secret1!" }))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        res.response()
            .cookies()
            .find(|cookie| cookie.name() == "session")
            .map(|cookie| cookie.into_owned())
            .expect("session cookie")
    }

    #[actix_web::test]
    async fn failed_applicant_fetch_is_reported_in_the_slice() {
        let mut content = MockContentSource::new();
        content
            .expect_fetch_applicant()
            .times(1)
            .return_once(|_| Err(ContentSourceError::transport("connection refused")));
        let mut ports = TestPorts::with_gateway(gateway_for(MemberRole::Member));
        ports.content = Arc::new(content);
        let app = profile_app!(ports.into_state());
        let cookie = signed_in_cookie(&app).await;

        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/api/v1/profile")
                .cookie(cookie)
                .to_request(),
        )
        .await;

        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["applicant"]["loading"], false);
        assert!(body["applicant"]["data"].is_null());
        assert!(
            body["applicant"]["error"]
                .as_str()
                .is_some_and(|message| message.contains("connection refused"))
        );
    }

    #[actix_web::test]
    async fn members_require_the_admin_role() {
        let app = profile_app!(TestPorts::with_gateway(gateway_for(MemberRole::Member)).into_state());
        let cookie = signed_in_cookie(&app).await;

        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/api/v1/admin/members")
                .cookie(cookie)
                .to_request(),
        )
        .await;

        assert_eq!(res.status(), StatusCode::FORBIDDEN);
    }

    #[actix_web::test]
    async fn sign_out_drops_the_session_store() {
        let state = TestPorts::with_gateway(gateway_for(MemberRole::Admin)).into_state();
        let app = profile_app!(state.clone());
        let cookie = signed_in_cookie(&app).await;

        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/api/v1/admin/members")
                .cookie(cookie.clone())
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(state.stores.len(), 1);

        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/v1/auth/sign-out")
                .cookie(cookie)
                .to_request(),
        )
        .await;

        assert_eq!(res.status(), StatusCode::NO_CONTENT);
        assert!(state.stores.is_empty());
    }
}
