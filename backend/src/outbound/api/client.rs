//! Reqwest client bound to the remote API base URL.
//!
//! Owns transport details only: URL joining, the default JSON content type,
//! the optional request timeout, status mapping and envelope decoding.

use std::time::Duration;

use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{Client, Method, StatusCode, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

/// Failures raised by [`ApiClient`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiClientError {
    /// The request URL could not be built from the base URL.
    #[error("invalid API URL: {message}")]
    Url { message: String },
    /// Connection, TLS or timeout failure.
    #[error("request failed: {message}")]
    Transport { message: String, timed_out: bool },
    /// The API answered with a non-success status.
    #[error("status {status}: {message}")]
    Status { status: u16, message: String },
    /// The body was not the expected JSON.
    #[error("invalid JSON payload: {message}")]
    Decode { message: String },
}

impl ApiClientError {
    /// Status code for [`ApiClientError::Status`].
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// One configured client for every API call.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: Url,
}

impl ApiClient {
    /// Build a client for `base_url`. `timeout` of `None` leaves requests
    /// unbounded.
    ///
    /// # Errors
    /// Returns an error when the base URL cannot carry a path or the reqwest
    /// client cannot be constructed.
    pub fn new(base_url: Url, timeout: Option<Duration>) -> Result<Self, ApiClientError> {
        if base_url.cannot_be_a_base() {
            return Err(ApiClientError::Url {
                message: format!("{base_url} cannot be used as a base URL"),
            });
        }
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let mut builder = Client::builder().default_headers(headers);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(|error| ApiClientError::Transport {
            message: error.to_string(),
            timed_out: false,
        })?;
        Ok(Self { client, base_url })
    }

    /// Base URL every request path is joined onto.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Append `segments` to the base URL, percent-encoding each one.
    ///
    /// # Errors
    /// Returns [`ApiClientError::Url`] when the base URL cannot carry a path.
    pub fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiClientError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ApiClientError::Url {
                message: format!("{} cannot carry a path", self.base_url),
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Issue one request and return the raw body of a 2xx response.
    ///
    /// # Errors
    /// See [`ApiClientError`].
    pub async fn request(
        &self,
        method: Method,
        segments: &[&str],
        body: Option<&Value>,
    ) -> Result<Vec<u8>, ApiClientError> {
        let url = self.endpoint(segments)?;
        debug!(%method, %url, "api request");
        let mut request = self.client.request(method.clone(), url.clone());
        if let Some(body) = body {
            request = request.json(body);
        }
        let response = request.send().await.map_err(|error| {
            warn!(%method, %url, %error, "api request failed");
            map_transport_error(&error)
        })?;

        let status = response.status();
        let bytes = response.bytes().await.map_err(|error| map_transport_error(&error))?;
        if !status.is_success() {
            let error = map_status_error(status, &bytes);
            warn!(%method, %url, status = status.as_u16(), %error, "api returned an error status");
            return Err(error);
        }
        Ok(bytes.to_vec())
    }

    /// GET `segments` and decode the payload.
    ///
    /// # Errors
    /// See [`ApiClientError`].
    pub async fn get_json<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T, ApiClientError> {
        let body = self.request(Method::GET, segments, None).await?;
        decode_payload(&body)
    }

    /// Send `body` as JSON and decode the response payload.
    ///
    /// # Errors
    /// See [`ApiClientError`].
    pub async fn send_json<B, T>(
        &self,
        method: Method,
        segments: &[&str],
        body: &B,
    ) -> Result<T, ApiClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self.send(method, segments, body).await?;
        decode_payload(&response)
    }

    /// Send `body` as JSON and return the raw response body.
    ///
    /// # Errors
    /// See [`ApiClientError`].
    pub async fn send<B>(&self, method: Method, segments: &[&str], body: &B) -> Result<Vec<u8>, ApiClientError>
    where
        B: Serialize + ?Sized,
    {
        let value = serde_json::to_value(body).map_err(|error| ApiClientError::Decode {
            message: format!("request body did not serialise: {error}"),
        })?;
        self.request(method, segments, Some(&value)).await
    }
}

/// Decode a payload that may be wrapped in a `{"data": ...}` envelope.
///
/// The bare document is tried first so payloads that legitimately carry a
/// `data` field still decode.
pub(crate) fn decode_payload<T: DeserializeOwned>(body: &[u8]) -> Result<T, ApiClientError> {
    let value: Value = serde_json::from_slice(body).map_err(|error| ApiClientError::Decode {
        message: error.to_string(),
    })?;
    decode_value(value)
}

pub(crate) fn decode_value<T: DeserializeOwned>(value: Value) -> Result<T, ApiClientError> {
    let bare_error = match serde_json::from_value::<T>(value.clone()) {
        Ok(decoded) => return Ok(decoded),
        Err(error) => error,
    };
    match value {
        Value::Object(mut map) if map.contains_key("data") => {
            let inner = map.remove("data").unwrap_or(Value::Null);
            serde_json::from_value(inner).map_err(|error| ApiClientError::Decode {
                message: error.to_string(),
            })
        }
        _ => Err(ApiClientError::Decode {
            message: bare_error.to_string(),
        }),
    }
}

fn map_transport_error(error: &reqwest::Error) -> ApiClientError {
    ApiClientError::Transport {
        message: error.to_string(),
        timed_out: error.is_timeout(),
    }
}

fn map_status_error(status: StatusCode, body: &[u8]) -> ApiClientError {
    let message = upstream_message(body).unwrap_or_else(|| {
        let preview = body_preview(body);
        if preview.is_empty() {
            format!("status {}", status.as_u16())
        } else {
            preview
        }
    });
    ApiClientError::Status {
        status: status.as_u16(),
        message,
    }
}

/// The `message` (or `error`) string of a JSON error body.
fn upstream_message(body: &[u8]) -> Option<String> {
    let value: Value = serde_json::from_slice(body).ok()?;
    ["message", "error"]
        .into_iter()
        .find_map(|key| value.get(key).and_then(Value::as_str))
        .map(str::trim)
        .filter(|message| !message.is_empty())
        .map(str::to_owned)
}

pub(crate) fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Item {
        id: String,
    }

    fn client(base: &str) -> ApiClient {
        ApiClient::new(Url::parse(base).expect("base url"), None).expect("client")
    }

    #[rstest]
    #[case("https://api.example.com", &["about", "faqs"], "https://api.example.com/about/faqs")]
    #[case("https://api.example.com/v1/", &["blogs"], "https://api.example.com/v1/blogs")]
    #[case("https://api.example.com/v1", &["applications", "a b/c"], "https://api.example.com/v1/applications/a%20b%2Fc")]
    fn endpoints_append_encoded_segments(
        #[case] base: &str,
        #[case] segments: &[&str],
        #[case] expected: &str,
    ) {
        let url = client(base).endpoint(segments).expect("endpoint");
        assert_eq!(url.as_str(), expected);
    }

    #[test]
    fn non_base_urls_are_rejected() {
        let url = Url::parse("mailto:ops@example.com").expect("url");
        assert!(matches!(
            ApiClient::new(url, None),
            Err(ApiClientError::Url { .. })
        ));
    }

    #[rstest]
    #[case(br#"[{"id":"1"}]"#.as_slice())]
    #[case(br#"{"data":[{"id":"1"}]}"#.as_slice())]
    fn payloads_decode_bare_or_enveloped(#[case] body: &[u8]) {
        let items: Vec<Item> = decode_payload(body).expect("decodes");
        assert_eq!(items, vec![Item { id: "1".to_owned() }]);
    }

    #[test]
    fn wrong_shapes_are_decode_errors() {
        let err = decode_payload::<Vec<Item>>(br#"{"items":[]}"#).expect_err("shape");
        assert!(matches!(err, ApiClientError::Decode { .. }));
    }

    #[rstest]
    #[case(br#"{"message":"Email already registered"}"#.as_slice(), "Email already registered")]
    #[case(br#"{"error":"Invalid credentials"}"#.as_slice(), "Invalid credentials")]
    #[case(b"<html>\n  Bad   gateway\n</html>".as_slice(), "<html> Bad gateway </html>")]
    #[case(b"".as_slice(), "status 502")]
    fn status_messages_prefer_the_upstream_message(#[case] body: &[u8], #[case] expected: &str) {
        let err = map_status_error(StatusCode::BAD_GATEWAY, body);
        assert_eq!(
            err,
            ApiClientError::Status {
                status: 502,
                message: expected.to_owned(),
            }
        );
    }

    #[test]
    fn long_bodies_are_truncated() {
        let body = "x".repeat(500);
        let preview = body_preview(body.as_bytes());
        assert_eq!(preview.chars().count(), 163);
        assert!(preview.ends_with("..."));
    }
}
