//! Upload API handlers.
//!
//! ```text
//! POST /api/v1/uploads?name=cv.pdf   (session; raw body, Content-Type set)
//! GET  /api/v1/uploads/status        (session)
//! ```
//!
//! The file is checked against the attachment rules, then handed to the
//! session's [`UploadTracker`](crate::domain::UploadTracker), which forwards
//! it as a multipart `file` part.

use actix_web::http::header::CONTENT_TYPE;
use actix_web::{HttpRequest, HttpResponse, get, post, web};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::domain::forms::{Attachment, MAX_ATTACHMENT_BYTES};
use crate::domain::ports::UploadFile;
use crate::domain::{Error, UploadStatus};
use crate::inbound::http::ApiResult;
use crate::inbound::http::cache_control::private_no_cache_header;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Body limit for the upload route. Slightly above the attachment limit so
/// oversized files get a 422 with an issue rather than a bare 413.
pub const UPLOAD_PAYLOAD_LIMIT: usize = (MAX_ATTACHMENT_BYTES as usize) + 1024 * 1024;

/// Query parameters for an upload.
#[derive(Debug, Deserialize, IntoParams)]
pub struct UploadQuery {
    /// Original file name.
    name: String,
}

fn declared_content_type(req: &HttpRequest) -> String {
    req.headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .map(|value| value.trim().to_ascii_lowercase())
        .unwrap_or_default()
}

/// Upload a document and remember its URL in the session.
#[utoipa::path(
    post,
    path = "/api/v1/uploads",
    params(UploadQuery),
    request_body(content = String, description = "Raw file bytes", content_type = "application/octet-stream"),
    responses(
        (status = 201, description = "Stored; returns the updated upload status", body = UploadStatus),
        (status = 401, description = "Sign-in required", body = Error),
        (status = 409, description = "Another upload is in progress", body = Error),
        (status = 422, description = "Unsupported type or too large", body = Error),
        (status = 502, description = "Upload endpoint unavailable", body = Error)
    ),
    tags = ["uploads"],
    operation_id = "uploadFile"
)]
#[post("/uploads")]
pub async fn upload_file(
    state: web::Data<HttpState>,
    session: SessionContext,
    req: HttpRequest,
    query: web::Query<UploadQuery>,
    body: web::Bytes,
) -> ApiResult<HttpResponse> {
    session.require_member()?;
    let file_name = query.into_inner().name.trim().to_owned();
    if file_name.is_empty() {
        return Err(Error::invalid_request("name must not be empty"));
    }
    let content_type = declared_content_type(&req);
    Attachment::check("file", &content_type, body.len() as u64)?;

    let store = state.store_for(&session)?;
    store
        .upload()
        .trigger(UploadFile {
            file_name,
            content_type,
            bytes: body.to_vec(),
        })
        .await?;

    Ok(HttpResponse::Created()
        .insert_header(private_no_cache_header())
        .json(store.upload().status()))
}

#[utoipa::path(
    get,
    path = "/api/v1/uploads/status",
    responses(
        (status = 200, description = "Current upload status", body = UploadStatus),
        (status = 401, description = "Sign-in required", body = Error)
    ),
    tags = ["uploads"],
    operation_id = "uploadStatus"
)]
#[get("/uploads/status")]
pub async fn upload_status(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<HttpResponse> {
    session.require_member()?;
    let status = state.store_for(&session)?.upload().status();
    Ok(HttpResponse::Ok()
        .insert_header(private_no_cache_header())
        .json(status))
}
