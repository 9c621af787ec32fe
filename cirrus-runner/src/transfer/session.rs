use cirrus_client::MultipartStore;
use cirrus_core::domain::multipart::{CompletedPart, CompletedParts};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::error::Result;

/// An open multipart upload
///
/// The session ends with [`UploadSession::complete`] or
/// [`UploadSession::abort`]. A session dropped while still open schedules
/// an abort on the current tokio runtime so no parts are left behind.
pub struct UploadSession {
    store: Arc<dyn MultipartStore>,
    key: String,
    upload_id: String,
    parts: CompletedParts,
    open: bool,
}

impl UploadSession {
    /// Creates the remote upload for `key`
    pub async fn begin(store: Arc<dyn MultipartStore>, key: impl Into<String>) -> Result<Self> {
        let key = key.into();
        let upload_id = store.create_upload(&key).await?;

        info!("Started multipart upload {} for {}", upload_id, key);

        Ok(Self {
            store,
            key,
            upload_id,
            parts: CompletedParts::new(),
            open: true,
        })
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn upload_id(&self) -> &str {
        &self.upload_id
    }

    pub fn store(&self) -> Arc<dyn MultipartStore> {
        Arc::clone(&self.store)
    }

    /// Requires exactly `count` parts before the upload can complete
    pub fn expect_parts(&mut self, count: usize) {
        self.parts.set_expected(count);
    }

    /// Number of parts recorded so far
    pub fn uploaded_parts(&self) -> usize {
        self.parts.len()
    }

    /// Uploads one part and records its completion token
    pub async fn upload_part(&mut self, number: i32, body: Vec<u8>) -> Result<()> {
        let size = body.len();
        let part = self
            .store
            .upload_part(&self.key, &self.upload_id, number, body)
            .await?;

        debug!("Uploaded part {} of {} ({} bytes)", number, self.key, size);

        self.record(part)
    }

    /// Records a part uploaded outside the session, e.g. by a spawned task
    pub fn record(&mut self, part: CompletedPart) -> Result<()> {
        self.parts.record(part)?;
        Ok(())
    }

    /// Completes the upload and returns the number of parts
    ///
    /// The part list is checked before anything is sent. If the check or the
    /// remote call fails, the upload is aborted and the error returned.
    pub async fn complete(mut self) -> Result<usize> {
        let parts = match self.parts.finalize() {
            Ok(parts) => parts,
            Err(err) => {
                self.abort_after_failure().await;
                return Err(err.into());
            }
        };

        if let Err(err) = self
            .store
            .complete_upload(&self.key, &self.upload_id, &parts)
            .await
        {
            self.abort_after_failure().await;
            return Err(err.into());
        }

        self.open = false;
        info!(
            "Completed multipart upload {} for {} ({} parts)",
            self.upload_id,
            self.key,
            parts.len()
        );

        Ok(parts.len())
    }

    /// Aborts the upload, discarding every uploaded part
    pub async fn abort(mut self) -> Result<()> {
        self.open = false;
        self.store.abort_upload(&self.key, &self.upload_id).await?;

        info!("Aborted multipart upload {} for {}", self.upload_id, self.key);
        Ok(())
    }

    /// Aborts while another error is already being returned
    pub(crate) async fn abort_after_failure(&mut self) {
        self.open = false;
        warn!("Aborting multipart upload {} for {}", self.upload_id, self.key);

        if let Err(err) = self.store.abort_upload(&self.key, &self.upload_id).await {
            error!(
                "Failed to abort multipart upload {} for {}: {}",
                self.upload_id, self.key, err
            );
        }
    }
}

impl Drop for UploadSession {
    fn drop(&mut self) {
        if !self.open {
            return;
        }

        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            error!(
                "Multipart upload {} for {} dropped outside a runtime and left open",
                self.upload_id, self.key
            );
            return;
        };

        warn!(
            "Multipart upload {} for {} dropped while open, aborting",
            self.upload_id, self.key
        );

        let store = Arc::clone(&self.store);
        let key = std::mem::take(&mut self.key);
        let upload_id = std::mem::take(&mut self.upload_id);

        runtime.spawn(async move {
            if let Err(err) = store.abort_upload(&key, &upload_id).await {
                error!(
                    "Failed to abort multipart upload {} for {}: {}",
                    upload_id, key, err
                );
            }
        });
    }
}
