//! Tests for HTTP error mapping.

use super::*;
use crate::domain::Issues;
use actix_web::body::to_bytes;
use actix_web::http::StatusCode;
use actix_web::ResponseError;
use rstest::{fixture, rstest};
use serde_json::{Value, json};

const TRACE_ID: &str = "00000000-0000-0000-0000-000000000000";

#[fixture]
fn expected_trace_id() -> String {
    TRACE_ID.to_owned()
}

#[rstest]
#[case(Error::invalid_request("bad"), StatusCode::BAD_REQUEST)]
#[case(Error::validation_failed("fields"), StatusCode::UNPROCESSABLE_ENTITY)]
#[case(Error::unauthorized("no auth"), StatusCode::UNAUTHORIZED)]
#[case(Error::forbidden("denied"), StatusCode::FORBIDDEN)]
#[case(Error::not_found("missing"), StatusCode::NOT_FOUND)]
#[case(Error::conflict("busy"), StatusCode::CONFLICT)]
#[case(Error::upstream_unavailable("down"), StatusCode::BAD_GATEWAY)]
#[case(Error::internal("boom"), StatusCode::INTERNAL_SERVER_ERROR)]
fn status_code_matches_error_code(#[case] err: Error, #[case] status: StatusCode) {
    assert_eq!(ResponseError::status_code(&err), status);
}

async fn response_payload(error: Error) -> (StatusCode, Option<String>, Value) {
    let response = ResponseError::error_response(&error);
    let status = response.status();
    let trace = response
        .headers()
        .get(TRACE_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned);
    let bytes = to_bytes(response.into_body())
        .await
        .expect("reading response body succeeds");
    let value = serde_json::from_slice(&bytes).expect("error JSON");
    (status, trace, value)
}

#[rstest]
#[actix_web::test]
async fn internal_errors_are_redacted(expected_trace_id: String) {
    let error = Error::internal("db password leaked")
        .with_trace_id(expected_trace_id.clone())
        .with_details(json!({ "secret": "x" }));

    let (status, trace, body) = response_payload(error).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(trace.as_deref(), Some(expected_trace_id.as_str()));
    assert_eq!(body["message"], "Internal server error");
    assert!(body.get("details").is_none());
    assert_eq!(body["traceId"], TRACE_ID);
}

#[rstest]
#[actix_web::test]
async fn validation_issues_are_returned_as_details() {
    let mut issues = Issues::default();
    issues.push(crate::domain::Issue::field("email", "Invalid email address"));
    issues.push(crate::domain::Issue::root("Either email or phone is required"));
    let error: Error = issues.into();

    let (status, trace, body) = response_payload(error).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(trace.is_none());
    assert_eq!(body["code"], "validation_failed");
    assert_eq!(
        body["details"]["issues"],
        json!([
            { "path": "email", "message": "Invalid email address" },
            { "message": "Either email or phone is required" },
        ])
    );
}

#[rstest]
#[actix_web::test]
async fn upstream_messages_pass_through() {
    let (status, _, body) = response_payload(Error::upstream_unavailable("maintenance window")).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["code"], "upstream_unavailable");
    assert_eq!(body["message"], "maintenance window");
}

#[test]
fn from_actix_error_is_redacted_internal_error() {
    let actix_err = actix_web::error::ErrorBadRequest("boom");
    let err: Error = actix_err.into();

    assert_eq!(err.code(), ErrorCode::InternalError);
    assert_eq!(err.message(), "Internal server error");
    assert_eq!(err.details(), None);
}
