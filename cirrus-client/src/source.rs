//! Traits at the seam between the runner and the cloud services
//!
//! Both traits are object safe so the runner can hold them behind `Arc<dyn _>`,
//! and small enough to be faked in tests.

use async_trait::async_trait;
use cirrus_core::domain::job::{JobHandle, Observation};
use cirrus_core::domain::multipart::CompletedPart;

use crate::error::Result;

/// Source of status observations for one kind of asynchronous job
#[async_trait]
pub trait JobStatusSource: Send + Sync {
    /// Status code reported by the service
    type Status: Send;

    /// Descriptive payload returned alongside the status
    type Payload: Send;

    /// Fetches the current status of the job identified by `handle`
    ///
    /// Errors are returned as-is; the caller decides whether they are fatal.
    async fn fetch_status(
        &self,
        handle: &JobHandle,
    ) -> Result<Observation<Self::Status, Self::Payload>>;
}

/// Object store that accepts multipart uploads
///
/// Keys are relative to whatever container (bucket) the store is bound to.
#[async_trait]
pub trait MultipartStore: Send + Sync {
    /// Starts an upload session and returns its id
    async fn create_upload(&self, key: &str) -> Result<String>;

    /// Uploads one part and returns its completion token
    async fn upload_part(
        &self,
        key: &str,
        upload_id: &str,
        number: i32,
        body: Vec<u8>,
    ) -> Result<CompletedPart>;

    /// Finalizes the upload from the ascending list of completed parts
    async fn complete_upload(&self, key: &str, upload_id: &str, parts: &[CompletedPart])
    -> Result<()>;

    /// Discards the upload session and every part uploaded to it
    async fn abort_upload(&self, key: &str, upload_id: &str) -> Result<()>;
}
