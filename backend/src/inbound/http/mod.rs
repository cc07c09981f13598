//! HTTP inbound adapter: server-rendered pages and the `/api/v1` JSON surface.

pub mod auth;
pub mod cache_control;
pub mod error;
pub mod forms;
pub mod health;
pub mod pages;
pub mod profile;
pub mod session;
pub mod session_config;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod uploads;
pub mod views;

use actix_web::web;

pub use error::ApiResult;

/// JSON endpoints, mounted by the caller under `/api/v1`.
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.service(auth::sign_in)
        .service(auth::sign_up)
        .service(auth::sign_out)
        .service(auth::request_password_reset)
        .service(auth::confirm_password_reset)
        .service(forms::submit_application)
        .service(forms::update_settings)
        .service(forms::submit_testimonial)
        .service(forms::submit_help_request)
        .service(forms::submit_contact)
        .service(profile::profile_state)
        .service(profile::members_state)
        .service(
            web::scope("")
                .app_data(web::PayloadConfig::new(uploads::UPLOAD_PAYLOAD_LIMIT))
                .service(uploads::upload_file)
                .service(uploads::upload_status),
        );
}

/// HTML pages at the site root.
pub fn configure_pages(cfg: &mut web::ServiceConfig) {
    cfg.service(pages::home)
        .service(pages::about)
        .service(pages::faqs)
        .service(pages::blogs)
        .service(pages::projects)
        .service(pages::events)
        .service(pages::membership)
        .service(pages::profile)
        .service(pages::admin)
        .service(pages::sign_in)
        .service(pages::sign_up)
        .service(pages::reset);
}
