//! Portal configuration loaded via OrthoConfig.
//!
//! Values layer CLI flags over `PORTAL_*` environment variables over an
//! optional configuration file. The remote API base URL may also come from
//! `NEXT_PUBLIC_API_BASE_URL`, which existing deployments already set.

use std::net::SocketAddr;
use std::time::Duration;

use mockable::Env;
use ortho_config::OrthoConfig;
use serde::Deserialize;
use url::Url;

use crate::domain::{CachePolicy, PagePolicies};

/// Fallback variable for the API base URL.
pub const PUBLIC_API_BASE_URL_ENV: &str = "NEXT_PUBLIC_API_BASE_URL";

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_UPLOAD_PATH: &str = "/api/uploadToDrive";

/// Runtime settings for the portal server.
#[derive(Debug, Clone, Default, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "PORTAL")]
pub struct PortalSettings {
    /// Socket address to listen on.
    pub bind_addr: Option<String>,
    /// Remote API base URL; overrides `NEXT_PUBLIC_API_BASE_URL`.
    pub api_base_url: Option<String>,
    /// Upload endpoint. Defaults to `/api/uploadToDrive` on the API origin.
    pub upload_url: Option<String>,
    /// Per-request timeout for upstream calls, in seconds; `0` disables it.
    #[ortho_config(default = 0)]
    pub request_timeout_secs: u64,
    /// Freshness window for the about page; `0` disables caching.
    pub about_cache_secs: Option<u64>,
    /// Freshness window for the blog list; `0` disables caching.
    pub blogs_cache_secs: Option<u64>,
    /// Freshness window for the project list; `0` disables caching.
    pub projects_cache_secs: Option<u64>,
}

/// Failures resolving settings into runtime values.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// Neither `PORTAL_API_BASE_URL` nor the public fallback is set.
    #[error("no API base URL configured; set PORTAL_API_BASE_URL or {PUBLIC_API_BASE_URL_ENV}")]
    MissingApiBaseUrl,
    /// A configured URL does not parse.
    #[error("invalid URL for {name}='{value}': {source}")]
    InvalidUrl {
        /// Variable the value came from.
        name: &'static str,
        /// Offending value.
        value: String,
        /// Parser failure.
        #[source]
        source: url::ParseError,
    },
    /// The bind address does not parse.
    #[error("invalid bind address '{value}': {source}")]
    InvalidBindAddr {
        /// Offending value.
        value: String,
        /// Parser failure.
        #[source]
        source: std::net::AddrParseError,
    },
}

fn parse_url(name: &'static str, value: &str) -> Result<Url, SettingsError> {
    Url::parse(value.trim()).map_err(|source| SettingsError::InvalidUrl {
        name,
        value: value.to_owned(),
        source,
    })
}

fn window(secs: Option<u64>, default: CachePolicy) -> CachePolicy {
    match secs {
        None => default,
        Some(0) => CachePolicy::NoStore,
        Some(secs) => CachePolicy::Revalidate(Duration::from_secs(secs)),
    }
}

impl PortalSettings {
    /// Socket address to listen on, defaulting to `0.0.0.0:8080`.
    ///
    /// # Errors
    /// Returns [`SettingsError::InvalidBindAddr`] when the value does not parse.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let value = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        value
            .parse()
            .map_err(|source| SettingsError::InvalidBindAddr {
                value: value.to_owned(),
                source,
            })
    }

    /// Upstream request timeout, or `None` when unset or zero.
    #[must_use]
    pub const fn request_timeout(&self) -> Option<Duration> {
        match self.request_timeout_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }

    /// Base URL of the remote API.
    ///
    /// # Errors
    /// Returns [`SettingsError::MissingApiBaseUrl`] when neither source is
    /// set, or [`SettingsError::InvalidUrl`] when the value does not parse.
    ///
    /// # Examples
    /// ```
    /// use mockable::MockEnv;
    /// use portal::settings::PortalSettings;
    ///
    /// let mut env = MockEnv::new();
    /// env.expect_string()
    ///     .returning(|_| Some("https://api.example.org/v1".to_owned()));
    ///
    /// let url = PortalSettings::default().api_base_url(&env).expect("url");
    /// assert_eq!(url.as_str(), "https://api.example.org/v1");
    /// ```
    pub fn api_base_url<E: Env>(&self, env: &E) -> Result<Url, SettingsError> {
        if let Some(value) = self.api_base_url.as_deref() {
            return parse_url("PORTAL_API_BASE_URL", value);
        }
        match env.string(PUBLIC_API_BASE_URL_ENV) {
            Some(value) if !value.trim().is_empty() => parse_url(PUBLIC_API_BASE_URL_ENV, &value),
            _ => Err(SettingsError::MissingApiBaseUrl),
        }
    }

    /// Upload endpoint, defaulting to the API origin's upload route.
    ///
    /// # Errors
    /// Returns [`SettingsError::InvalidUrl`] when the value does not parse.
    pub fn upload_url(&self, api_base_url: &Url) -> Result<Url, SettingsError> {
        match self.upload_url.as_deref() {
            Some(value) => parse_url("PORTAL_UPLOAD_URL", value),
            None => api_base_url
                .join(DEFAULT_UPLOAD_PATH)
                .map_err(|source| SettingsError::InvalidUrl {
                    name: "PORTAL_UPLOAD_URL",
                    value: DEFAULT_UPLOAD_PATH.to_owned(),
                    source,
                }),
        }
    }

    /// Page cache policies with configured windows applied.
    #[must_use]
    pub fn page_policies(&self) -> PagePolicies {
        let defaults = PagePolicies::default();
        PagePolicies {
            about: window(self.about_cache_secs, defaults.about),
            blogs: window(self.blogs_cache_secs, defaults.blogs),
            projects: window(self.projects_cache_secs, defaults.projects),
            ..defaults
        }
    }
}
