//! Multipart upload adapter for the file storage endpoint.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Url};
use serde::Deserialize;

use crate::domain::ports::{FileUploadError, FileUploader, UploadFile};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UploadResponseDto {
    file_url: String,
}

/// Posts files as the `file` part of a multipart body and reads `fileUrl`
/// from the response.
#[derive(Debug, Clone)]
pub struct HttpFileUploader {
    client: Client,
    endpoint: Url,
}

impl HttpFileUploader {
    /// # Errors
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(endpoint: Url, timeout: Option<Duration>) -> Result<Self, reqwest::Error> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
            endpoint,
        })
    }
}

#[async_trait]
impl FileUploader for HttpFileUploader {
    async fn upload(&self, file: UploadFile) -> Result<String, FileUploadError> {
        let part = Part::bytes(file.bytes)
            .file_name(file.file_name)
            .mime_str(&file.content_type)
            .map_err(|error| FileUploadError::rejected(400_u16, error.to_string()))?;
        let response = self
            .client
            .post(self.endpoint.clone())
            .multipart(Form::new().part("file", part))
            .send()
            .await
            .map_err(|error| FileUploadError::transport(error.to_string()))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|error| FileUploadError::transport(error.to_string()))?;
        if !status.is_success() {
            return Err(FileUploadError::rejected(
                status.as_u16(),
                rejection_message(status.as_u16(), &body),
            ));
        }
        parse_file_url(&body)
    }
}

fn rejection_message(status: u16, body: &[u8]) -> String {
    serde_json::from_slice::<serde_json::Value>(body)
        .ok()
        .and_then(|value| {
            ["message", "error"]
                .into_iter()
                .find_map(|key| value.get(key).and_then(serde_json::Value::as_str).map(str::to_owned))
        })
        .unwrap_or_else(|| format!("status {status}"))
}

fn parse_file_url(body: &[u8]) -> Result<String, FileUploadError> {
    let dto: UploadResponseDto = serde_json::from_slice(body)
        .map_err(|error| FileUploadError::decode(error.to_string()))?;
    if dto.file_url.trim().is_empty() {
        return Err(FileUploadError::decode("fileUrl must not be empty"));
    }
    Ok(dto.file_url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn reads_file_url() {
        let url = parse_file_url(br#"{"fileUrl":"https://drive.example/f/1"}"#).expect("url");
        assert_eq!(url, "https://drive.example/f/1");
    }

    #[rstest]
    #[case(br#"{"url":"https://drive.example/f/1"}"#.as_slice())]
    #[case(br#"{"fileUrl":"  "}"#.as_slice())]
    #[case(b"not json".as_slice())]
    fn malformed_responses_are_decode_errors(#[case] body: &[u8]) {
        assert!(matches!(
            parse_file_url(body),
            Err(FileUploadError::Decode { .. })
        ));
    }

    #[test]
    fn rejection_uses_the_upstream_message() {
        assert_eq!(rejection_message(413, br#"{"error":"File too large"}"#), "File too large");
        assert_eq!(rejection_message(500, b""), "status 500");
    }
}
