//! Per-session upload tracker.
//!
//! Uploads are single-flight: while one is pending, a second trigger is
//! refused with [`UploadTriggerError::Busy`] and the tracked state is left
//! untouched. The loading flag is cleared when the trigger finishes, even if
//! the caller stops polling it part way through.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::Serialize;
use tracing::{info, warn};
use utoipa::ToSchema;

use super::Error;
use super::ports::{FileUploadError, FileUploader, UploadFile};

/// Observable upload state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadStatus {
    /// An upload is in flight.
    pub loading: bool,
    /// Message from the last failed upload.
    pub error: Option<String>,
    /// URL of the last stored file.
    pub file_url: Option<String>,
}

/// Why a trigger produced no URL.
#[derive(Debug, thiserror::Error)]
pub enum UploadTriggerError {
    /// Another upload for this session is still pending.
    #[error("an upload is already in progress")]
    Busy,
    /// The uploader failed.
    #[error(transparent)]
    Upload(#[from] FileUploadError),
}

/// Tracks one session's upload: its loading flag, last error and file URL.
pub struct UploadTracker {
    uploader: Arc<dyn FileUploader>,
    status: Mutex<UploadStatus>,
}

impl std::fmt::Debug for UploadTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadTracker")
            .field("status", &*self.lock())
            .finish_non_exhaustive()
    }
}

fn lock_status(status: &Mutex<UploadStatus>) -> MutexGuard<'_, UploadStatus> {
    status.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Clears `loading` if a trigger is dropped before it records an outcome.
struct PendingUpload<'a> {
    status: &'a Mutex<UploadStatus>,
    settled: bool,
}

impl Drop for PendingUpload<'_> {
    fn drop(&mut self) {
        if !self.settled {
            lock_status(self.status).loading = false;
            warn!("upload abandoned before completion");
        }
    }
}

impl UploadTracker {
    /// Create an idle tracker over `uploader`.
    #[must_use]
    pub fn new(uploader: Arc<dyn FileUploader>) -> Self {
        Self {
            uploader,
            status: Mutex::new(UploadStatus::default()),
        }
    }

    /// Snapshot of the current state.
    #[must_use]
    pub fn status(&self) -> UploadStatus {
        self.lock().clone()
    }

    /// Upload `file` and record the outcome.
    ///
    /// On success the new URL replaces any previous one. On failure the
    /// previous URL is kept and the error message is recorded.
    ///
    /// # Errors
    /// [`UploadTriggerError::Busy`] when an upload is already pending, or the
    /// uploader's error.
    pub async fn trigger(&self, file: UploadFile) -> Result<String, UploadTriggerError> {
        {
            let mut status = self.lock();
            if status.loading {
                return Err(UploadTriggerError::Busy);
            }
            status.loading = true;
            status.error = None;
        }
        let mut pending = PendingUpload {
            status: &self.status,
            settled: false,
        };

        let file_name = file.file_name.clone();
        let size = file.size();
        let outcome = self.uploader.upload(file).await;

        let mut status = self.lock();
        pending.settled = true;
        status.loading = false;
        match outcome {
            Ok(url) => {
                info!(file = %file_name, size, url = %url, "upload stored");
                status.file_url = Some(url.clone());
                Ok(url)
            }
            Err(error) => {
                warn!(file = %file_name, size, error = %error, "upload failed");
                status.error = Some(error.to_string());
                Err(error.into())
            }
        }
    }

    /// Clear the tracked state unless an upload is pending.
    pub fn reset(&self) {
        let mut status = self.lock();
        if !status.loading {
            *status = UploadStatus::default();
        }
    }

    fn lock(&self) -> MutexGuard<'_, UploadStatus> {
        lock_status(&self.status)
    }
}

impl From<UploadTriggerError> for Error {
    fn from(err: UploadTriggerError) -> Self {
        match err {
            UploadTriggerError::Busy => Error::conflict(err.to_string()),
            UploadTriggerError::Upload(FileUploadError::Rejected { status, message })
                if (400..500).contains(&status) =>
            {
                Error::invalid_request(message)
                    .with_details(serde_json::json!({ "upstreamStatus": status }))
            }
            UploadTriggerError::Upload(error) => Error::upstream_unavailable(error.to_string()),
        }
    }
}
