//! Port for pushing a file to remote storage.

use async_trait::async_trait;

use super::define_port_error;

define_port_error! {
    /// Errors raised by the upload endpoint.
    pub enum FileUploadError {
        /// Connection failure.
        Transport { message: String } =>
            "upload failed: {message}",
        /// The endpoint answered with a non-success status.
        Rejected { status: u16, message: String } =>
            "upload rejected ({status}): {message}",
        /// Success status but no usable `fileUrl` in the body.
        Decode { message: String } =>
            "upload response was malformed: {message}",
    }
}

/// File contents plus the metadata sent with the multipart part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    /// Original file name.
    pub file_name: String,
    /// Declared MIME type.
    pub content_type: String,
    /// File contents.
    pub bytes: Vec<u8>,
}

impl UploadFile {
    /// Size in bytes.
    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// Uploads one file and returns its public URL.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FileUploader: Send + Sync {
    async fn upload(&self, file: UploadFile) -> Result<String, FileUploadError>;
}

/// Fixture uploader returning a deterministic URL derived from the file name.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureFileUploader;

#[async_trait]
impl FileUploader for FixtureFileUploader {
    async fn upload(&self, file: UploadFile) -> Result<String, FileUploadError> {
        Ok(format!("https://files.invalid/{}", file.file_name))
    }
}
