//! HTML rendering for server-side pages.
//!
//! Templates are compiled into the binary and loaded into one [`Tera`]
//! instance at start-up. Every page extends `layout.html`, which supplies the
//! shared header, footer and page heading.

use actix_web::HttpResponse;
use actix_web::http::StatusCode;
use actix_web::http::header::{CACHE_CONTROL, ContentType, HeaderName};
use serde::Serialize;
use tera::{Context, Tera};
use tracing::error;

use crate::domain::{SignedInMember, TraceId};

/// Message shown when a page fails without a usable upstream message.
pub const ERROR_FALLBACK: &str = "Something went wrong while loading this page.";

const TEMPLATES: [(&str, &str); 14] = [
    ("layout.html", include_str!("../../../templates/layout.html")),
    ("error.html", include_str!("../../../templates/error.html")),
    ("home.html", include_str!("../../../templates/home.html")),
    ("about.html", include_str!("../../../templates/about.html")),
    ("faqs.html", include_str!("../../../templates/faqs.html")),
    ("blogs.html", include_str!("../../../templates/blogs.html")),
    ("projects.html", include_str!("../../../templates/projects.html")),
    ("events.html", include_str!("../../../templates/events.html")),
    ("membership.html", include_str!("../../../templates/membership.html")),
    ("profile.html", include_str!("../../../templates/profile.html")),
    ("admin.html", include_str!("../../../templates/admin.html")),
    ("sign_in.html", include_str!("../../../templates/sign_in.html")),
    ("sign_up.html", include_str!("../../../templates/sign_up.html")),
    ("reset.html", include_str!("../../../templates/reset.html")),
];

/// Context for one page: its heading plus named values.
pub struct PageContext(Context);

impl PageContext {
    /// Context titled `title`, carrying the viewer when signed in.
    pub fn new(title: &str, member: Option<&SignedInMember>) -> Self {
        let mut context = Context::new();
        context.insert("title", title);
        if let Some(member) = member {
            context.insert("member", member);
        }
        Self(context)
    }

    /// Add `value` under `key`.
    #[must_use]
    pub fn with<T: Serialize + ?Sized>(mut self, key: &str, value: &T) -> Self {
        self.0.insert(key, value);
        self
    }
}

/// Compiled page templates.
pub struct Views {
    tera: Tera,
}

impl Views {
    /// Compile the embedded templates.
    ///
    /// # Errors
    /// Returns the Tera error for the first template that fails to parse.
    pub fn new() -> Result<Self, tera::Error> {
        let mut tera = Tera::default();
        tera.add_raw_templates(TEMPLATES)?;
        Ok(Self { tera })
    }

    /// Render `template` to an HTML response carrying `cache_control`.
    pub fn page(
        &self,
        template: &str,
        context: &PageContext,
        cache_control: (HeaderName, String),
    ) -> HttpResponse {
        self.respond(StatusCode::OK, template, context, cache_control)
    }

    /// The error view with `message`, or the generic fallback when the
    /// message is blank.
    pub fn error_page(&self, message: &str, member: Option<&SignedInMember>) -> HttpResponse {
        let message = if message.trim().is_empty() {
            ERROR_FALLBACK
        } else {
            message
        };
        let context = PageContext::new("Something went wrong", member).with("message", message);
        self.respond(
            StatusCode::BAD_GATEWAY,
            "error.html",
            &context,
            (CACHE_CONTROL, "no-store".to_owned()),
        )
    }

    fn respond(
        &self,
        status: StatusCode,
        template: &str,
        context: &PageContext,
        cache_control: (HeaderName, String),
    ) -> HttpResponse {
        match self.tera.render(template, &context.0) {
            Ok(body) => HttpResponse::build(status)
                .content_type(ContentType::html())
                .insert_header(cache_control)
                .body(body),
            Err(render_error) => {
                error!(
                    template,
                    error = ?render_error,
                    trace_id = ?TraceId::current(),
                    "template rendering failed"
                );
                HttpResponse::InternalServerError()
                    .content_type(ContentType::plaintext())
                    .insert_header((CACHE_CONTROL, "no-store"))
                    .body(ERROR_FALLBACK)
            }
        }
    }
}
