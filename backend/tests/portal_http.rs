//! Full-stack behaviour: pages and the JSON API wired over the real
//! adapters, talking to a fake upstream.

#[path = "support/upstream.rs"]
mod upstream;

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use actix_http::Request;
use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::body::MessageBody;
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::http::header::{CACHE_CONTROL, CONTENT_TYPE, LOCATION};
use actix_web::{App, HttpResponse, test, web};
use mockable::DefaultClock;
use portal::Trace;
use portal::domain::{PagePolicies, TRACE_ID_HEADER};
use portal::inbound::http::error::json_error_handler;
use portal::inbound::http::state::{HttpState, HttpStatePorts};
use portal::inbound::http::{configure_api, configure_pages};
use portal::outbound::api::{ApiClient, HttpContentSource, HttpSubmissionGateway};
use portal::outbound::cache::InMemoryPageCache;
use portal::outbound::upload::HttpFileUploader;
use rstest::rstest;
use serde_json::{Value, json};
use upstream::FakeUpstream;

fn portal_state(upstream: &FakeUpstream) -> web::Data<HttpState> {
    let timeout = Some(Duration::from_secs(5));
    let client = Arc::new(ApiClient::new(upstream.base_url(), timeout).expect("api client"));
    let ports = HttpStatePorts {
        content: Arc::new(HttpContentSource::new(client.clone())),
        gateway: Arc::new(HttpSubmissionGateway::new(client)),
        uploader: Arc::new(HttpFileUploader::new(upstream.upload_url(), timeout).expect("uploader")),
        cache: Arc::new(InMemoryPageCache::new()),
        clock: Arc::new(DefaultClock),
    };
    web::Data::new(HttpState::new(ports, PagePolicies::default()).expect("templates compile"))
}

async fn portal_app(
    upstream: &FakeUpstream,
) -> impl Service<Request, Response = ServiceResponse<impl MessageBody>, Error = actix_web::Error> {
    let session = SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build();
    test::init_service(
        App::new()
            .app_data(portal_state(upstream))
            .wrap(session)
            .wrap(Trace)
            .service(
                web::scope("/api/v1")
                    .app_data(web::JsonConfig::default().error_handler(json_error_handler))
                    .configure(configure_api),
            )
            .configure(configure_pages),
    )
    .await
}

fn header<B>(res: &ServiceResponse<B>, name: &str) -> String {
    res.headers()
        .get(name)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_owned()
}

async fn body_text<B: MessageBody>(res: ServiceResponse<B>) -> String {
    String::from_utf8_lossy(&test::read_body(res).await).into_owned()
}

fn member_routes(cfg: &mut web::ServiceConfig) {
    cfg.route(
        "/auth/sign-in",
        web::post().to(|| async {
            HttpResponse::Ok().json(json!({
                "user": { "_id": "u-1", "name": "Ada Lovelace", "role": "member" }
            }))
        }),
    )
    .route(
        "/applications/{id}",
        web::get().to(|path: web::Path<String>| async move {
            HttpResponse::Ok().json(json!({
                "_id": "app-1",
                "user_id": path.into_inner(),
                "status": "pending",
                "specialization_area": "Structural engineering"
            }))
        }),
    );
}

#[actix_web::test]
async fn about_page_is_served_from_cache_within_its_window() {
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = hits.clone();
    let upstream = FakeUpstream::start(move |cfg| {
        let counter = counter.clone();
        cfg.route(
            "/about",
            web::get().to(move || {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    HttpResponse::Ok().json(json!({
                        "title": "About the guild",
                        "mission": "Mentor the next generation of engineers"
                    }))
                }
            }),
        );
    })
    .expect("upstream");
    let app = portal_app(&upstream).await;

    for _ in 0..2 {
        let res = test::call_service(&app, test::TestRequest::get().uri("/about").to_request()).await;
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(header(&res, CACHE_CONTROL.as_str()), "public, max-age=3600, must-revalidate");
        assert!(body_text(res).await.contains("About the guild"));
    }

    assert_eq!(hits.load(Ordering::SeqCst), 1);
    upstream.stop().await;
}

#[actix_web::test]
async fn failed_fetch_renders_the_error_view() {
    let upstream = FakeUpstream::start(|cfg| {
        cfg.route(
            "/events",
            web::get().to(|| async {
                HttpResponse::ServiceUnavailable().json(json!({ "message": "maintenance window" }))
            }),
        )
        .route("/blogs", web::get().to(|| async { HttpResponse::Ok().json(json!([])) }));
    })
    .expect("upstream");
    let app = portal_app(&upstream).await;

    let res = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;

    assert_eq!(res.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(header(&res, CACHE_CONTROL.as_str()), "no-store");
    assert!(!header(&res, TRACE_ID_HEADER).is_empty());
    assert!(body_text(res).await.contains("maintenance window"));
    upstream.stop().await;
}

#[actix_web::test]
async fn anonymous_profile_visits_are_sent_to_sign_in() {
    let upstream = FakeUpstream::start(|_| {}).expect("upstream");
    let app = portal_app(&upstream).await;

    let res = test::call_service(&app, test::TestRequest::get().uri("/profile").to_request()).await;

    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(header(&res, LOCATION.as_str()), "/auth/sign-in?next=/profile");
    upstream.stop().await;
}

#[actix_web::test]
async fn signed_in_member_sees_their_application() {
    let upstream = FakeUpstream::start(member_routes).expect("upstream");
    let app = portal_app(&upstream).await;

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/auth/sign-in")
            .set_json(json!({ "email": "ada@example.com", "password": "Secret1!" }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    let cookie: Cookie<'static> = res
        .response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .map(|cookie| cookie.into_owned())
        .expect("session cookie");

    let res = test::call_service(
        &app,
        test::TestRequest::get().uri("/profile").cookie(cookie).to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::OK);
    assert!(header(&res, CACHE_CONTROL.as_str()).starts_with("private"));
    let html = body_text(res).await;
    assert!(html.contains("Ada Lovelace"));
    assert!(html.contains("Structural engineering"));
    upstream.stop().await;
}

#[rstest]
#[case("{not json", StatusCode::BAD_REQUEST, "invalid_request")]
#[case(r#"{"name":"Ada","email":"ada@example.com"}"#, StatusCode::UNPROCESSABLE_ENTITY, "validation_failed")]
#[actix_web::test]
async fn bad_contact_bodies_are_rejected_locally(
    #[case] payload: &'static str,
    #[case] expected: StatusCode,
    #[case] code: &str,
) {
    let upstream = FakeUpstream::start(|_| {}).expect("upstream");
    let app = portal_app(&upstream).await;

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/contact")
            .insert_header((CONTENT_TYPE, "application/json"))
            .set_payload(payload)
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), expected);
    let trace_id = header(&res, TRACE_ID_HEADER);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["code"], code);
    assert_eq!(body["traceId"], trace_id.as_str());
    upstream.stop().await;
}
