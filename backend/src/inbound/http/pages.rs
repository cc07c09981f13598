//! Server-rendered HTML pages.
//!
//! Public pages fetch through the [`PageService`](crate::domain::PageService)
//! and fall back to the error view when the fetch fails. Session pages
//! redirect anonymous visitors to sign-in and render from slice state.

use actix_web::http::header::{CACHE_CONTROL, HeaderName, LOCATION};
use actix_web::{HttpResponse, get, web};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::domain::content::group_faqs;
use crate::domain::ports::ContentSourceError;
use crate::domain::{CachePolicy, PageKey, SignedInMember};
use crate::inbound::http::cache_control::{PRIVATE_NO_CACHE_MUST_REVALIDATE, page_cache_header};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::views::PageContext;

const SIGN_IN_PATH: &str = "/auth/sign-in";
const HOME_PREVIEW_LEN: usize = 3;

/// The signed-in member, treating an unreadable cookie as anonymous.
fn viewer(session: &SessionContext) -> Option<SignedInMember> {
    session.member().unwrap_or_else(|error| {
        warn!(%error, "ignoring unreadable session");
        None
    })
}

/// Personalised pages must never land in a shared cache.
fn cache_header(policy: CachePolicy, viewer: Option<&SignedInMember>) -> (HeaderName, String) {
    match viewer {
        Some(_) => (CACHE_CONTROL, PRIVATE_NO_CACHE_MUST_REVALIDATE.to_owned()),
        None => page_cache_header(policy),
    }
}

fn private_header() -> (HeaderName, String) {
    (CACHE_CONTROL, PRIVATE_NO_CACHE_MUST_REVALIDATE.to_owned())
}

fn redirect(location: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((LOCATION, location))
        .insert_header((CACHE_CONTROL, "no-store"))
        .finish()
}

fn sign_in_redirect(next: &str) -> HttpResponse {
    redirect(&format!("{SIGN_IN_PATH}?next={next}"))
}

/// Render one content page, or the error view when `loaded` failed.
fn content_page<T: Serialize>(
    state: &HttpState,
    viewer: Option<&SignedInMember>,
    key: PageKey,
    (template, title, name): (&str, &str, &str),
    loaded: Result<T, ContentSourceError>,
) -> HttpResponse {
    match loaded {
        Ok(value) => state.views.page(
            template,
            &PageContext::new(title, viewer).with(name, &value),
            cache_header(state.pages.policy(key), viewer),
        ),
        Err(error) => state.views.error_page(&error.to_string(), viewer),
    }
}

/// Landing page with upcoming events and recent posts.
#[get("/")]
pub async fn home(state: web::Data<HttpState>, session: SessionContext) -> HttpResponse {
    let viewer = viewer(&session);
    let (upcoming, latest) =
        futures_util::future::join(state.pages.events(), state.pages.blogs()).await;
    match (upcoming, latest) {
        (Ok(mut upcoming), Ok(mut latest)) => {
            upcoming.truncate(HOME_PREVIEW_LEN);
            latest.truncate(HOME_PREVIEW_LEN);
            let context = PageContext::new("Welcome", viewer.as_ref())
                .with("events", &upcoming)
                .with("posts", &latest);
            // Events are never stored, so the home page follows them.
            state.views.page(
                "home.html",
                &context,
                cache_header(state.pages.policy(PageKey::Events), viewer.as_ref()),
            )
        }
        (Err(error), _) | (_, Err(error)) => {
            state.views.error_page(&error.to_string(), viewer.as_ref())
        }
    }
}

/// About page.
#[get("/about")]
pub async fn about(state: web::Data<HttpState>, session: SessionContext) -> HttpResponse {
    let viewer = viewer(&session);
    let loaded = state.pages.about().await;
    content_page(
        &state,
        viewer.as_ref(),
        PageKey::About,
        ("about.html", "About us", "about"),
        loaded,
    )
}

/// FAQs grouped by category.
#[get("/about/faqs")]
pub async fn faqs(state: web::Data<HttpState>, session: SessionContext) -> HttpResponse {
    let viewer = viewer(&session);
    let loaded = state.pages.faqs().await.map(group_faqs);
    content_page(
        &state,
        viewer.as_ref(),
        PageKey::Faqs,
        ("faqs.html", "Frequently asked questions", "groups"),
        loaded,
    )
}

/// Blog index.
#[get("/blogs")]
pub async fn blogs(state: web::Data<HttpState>, session: SessionContext) -> HttpResponse {
    let viewer = viewer(&session);
    let loaded = state.pages.blogs().await;
    content_page(
        &state,
        viewer.as_ref(),
        PageKey::Blogs,
        ("blogs.html", "Blog", "posts"),
        loaded,
    )
}

/// Project list.
#[get("/projects")]
pub async fn projects(state: web::Data<HttpState>, session: SessionContext) -> HttpResponse {
    let viewer = viewer(&session);
    let loaded = state.pages.projects().await;
    content_page(
        &state,
        viewer.as_ref(),
        PageKey::Projects,
        ("projects.html", "Projects", "projects"),
        loaded,
    )
}

/// Event list.
#[get("/events")]
pub async fn events(state: web::Data<HttpState>, session: SessionContext) -> HttpResponse {
    let viewer = viewer(&session);
    let loaded = state.pages.events().await;
    content_page(
        &state,
        viewer.as_ref(),
        PageKey::Events,
        ("events.html", "Events", "events"),
        loaded,
    )
}

/// Static membership page with the application and contact forms.
#[get("/membership")]
pub async fn membership(state: web::Data<HttpState>, session: SessionContext) -> HttpResponse {
    let viewer = viewer(&session);
    state.views.page(
        "membership.html",
        &PageContext::new("Membership", viewer.as_ref()),
        cache_header(state.pages.policy(PageKey::About), viewer.as_ref()),
    )
}

/// The member's application, upload status and settings forms.
#[get("/profile")]
pub async fn profile(state: web::Data<HttpState>, session: SessionContext) -> HttpResponse {
    let Some(member) = viewer(&session) else {
        return sign_in_redirect("/profile");
    };
    let store = match state.store_for(&session) {
        Ok(store) => store,
        Err(error) => return state.views.error_page(error.message(), Some(&member)),
    };

    // Failures are recorded in the slice and rendered inline.
    if let Err(error) = store
        .load_applicant(state.content.as_ref(), &member.id)
        .await
    {
        debug!(%error, "applicant load failed; recorded in slice");
    }

    let context = PageContext::new("Your profile", Some(&member))
        .with("applicant", &store.applicant())
        .with("upload", &store.upload().status());
    state.views.page("profile.html", &context, private_header())
}

/// Member directory for administrators.
#[get("/admin")]
pub async fn admin(state: web::Data<HttpState>, session: SessionContext) -> HttpResponse {
    let Some(member) = viewer(&session) else {
        return sign_in_redirect("/admin");
    };
    if !member.is_admin() {
        return redirect("/profile");
    }
    let store = match state.store_for(&session) {
        Ok(store) => store,
        Err(error) => return state.views.error_page(error.message(), Some(&member)),
    };

    if let Err(error) = store.load_members(state.content.as_ref()).await {
        debug!(%error, "members load failed; recorded in slice");
    }

    let context = PageContext::new("Members", Some(&member)).with("members", &store.members());
    state.views.page("admin.html", &context, private_header())
}

/// Query for the sign-in page.
#[derive(Debug, Default, Deserialize)]
pub struct SignInQuery {
    next: Option<String>,
}

/// Only same-site absolute paths usable as a `Location` are followed.
fn safe_next(next: Option<&str>) -> &str {
    match next {
        Some(path)
            if path.starts_with('/')
                && !path.starts_with("//")
                && !path.contains('\\')
                && !path.chars().any(char::is_control) =>
        {
            path
        }
        _ => "/profile",
    }
}

/// Sign-in form, or a redirect when already signed in.
#[get("/auth/sign-in")]
pub async fn sign_in(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<SignInQuery>,
) -> HttpResponse {
    let next = safe_next(query.next.as_deref());
    if viewer(&session).is_some() {
        return redirect(next);
    }
    state.views.page(
        "sign_in.html",
        &PageContext::new("Sign in", None).with("next", next),
        private_header(),
    )
}

/// Sign-up form.
#[get("/auth/sign-up")]
pub async fn sign_up(state: web::Data<HttpState>, session: SessionContext) -> HttpResponse {
    if viewer(&session).is_some() {
        return redirect("/profile");
    }
    state.views.page(
        "sign_up.html",
        &PageContext::new("Create an account", None),
        private_header(),
    )
}

/// Query for the reset page.
#[derive(Debug, Default, Deserialize)]
pub struct ResetQuery {
    token: Option<String>,
}

/// Reset request and confirmation forms. A `token` query parameter from the
/// reset e-mail pre-fills the confirmation form.
#[get("/auth/reset")]
pub async fn reset(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<ResetQuery>,
) -> HttpResponse {
    let viewer = viewer(&session);
    let token = query.token.as_deref().unwrap_or_default();
    state.views.page(
        "reset.html",
        &PageContext::new("Reset your password", viewer.as_ref()).with("token", token),
        private_header(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(None, "/profile")]
    #[case(Some("/admin"), "/admin")]
    #[case(Some("//evil.example"), "/profile")]
    #[case(Some("https://evil.example"), "/profile")]
    #[case(Some("/\\evil.example"), "/profile")]
    #[case(Some("/admin\r\nSet-Cookie: x=1"), "/profile")]
    #[case(Some("/admin\u{7f}"), "/profile")]
    fn next_is_restricted_to_local_paths(#[case] next: Option<&str>, #[case] expected: &str) {
        assert_eq!(safe_next(next), expected);
    }

    #[test]
    fn header_breaking_next_still_redirects() {
        let res = redirect(safe_next(Some("/profile\nLocation: https://evil.example")));
        assert_eq!(res.status(), actix_web::http::StatusCode::SEE_OTHER);
        assert_eq!(
            res.headers().get(LOCATION).and_then(|v| v.to_str().ok()),
            Some("/profile")
        );
    }
}
