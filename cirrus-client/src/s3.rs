//! S3 directory buckets (S3 Express One Zone)
//!
//! Directory buckets live in a single Availability Zone and are named
//! `<base-name>--<zone-id>--x-s3`. The SDK takes care of the session-based
//! authentication they require.

use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_s3::Client;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::{
    BucketInfo, BucketType, CompletedMultipartUpload, CreateBucketConfiguration, DataRedundancy,
    LocationInfo, LocationType,
};
use aws_smithy_types::date_time::Format;
use cirrus_core::domain::multipart::CompletedPart;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{ClientError, Result, ServiceResultExt};
use crate::source::MultipartStore;

/// Suffix every directory bucket name ends with
pub const DIRECTORY_BUCKET_SUFFIX: &str = "--x-s3";

/// An upload session that was started but neither completed nor aborted
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingUpload {
    pub key: String,
    pub upload_id: String,
    pub initiated: Option<String>,
}

/// Client bound to one directory bucket
#[derive(Debug, Clone)]
pub struct DirectoryBucketClient {
    client: Client,
    bucket: String,
}

impl DirectoryBucketClient {
    pub fn new(config: &SdkConfig, bucket: impl Into<String>) -> Self {
        Self::from_client(Client::new(config), bucket)
    }

    pub fn from_client(client: Client, bucket: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
        }
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Availability Zone id embedded in the bucket name, e.g. `usw2-az1`
    pub fn zone_id(&self) -> Option<&str> {
        let stem = self.bucket.strip_suffix(DIRECTORY_BUCKET_SUFFIX)?;
        let (_, zone) = stem.rsplit_once("--")?;
        (!zone.is_empty()).then_some(zone)
    }

    // =============================================================================
    // Bucket lifecycle
    // =============================================================================

    /// Creates the bucket in the Availability Zone named by its suffix
    pub async fn create_bucket(&self) -> Result<()> {
        let zone = self.zone_id().ok_or_else(|| {
            ClientError::InvalidRequest(format!(
                "directory bucket names look like <name>--<zone-id>{}, got {}",
                DIRECTORY_BUCKET_SUFFIX, self.bucket
            ))
        })?;

        let configuration = CreateBucketConfiguration::builder()
            .location(
                LocationInfo::builder()
                    .r#type(LocationType::AvailabilityZone)
                    .name(zone)
                    .build(),
            )
            .bucket(
                BucketInfo::builder()
                    .data_redundancy(DataRedundancy::SingleAvailabilityZone)
                    .r#type(BucketType::Directory)
                    .build(),
            )
            .build();

        self.client
            .create_bucket()
            .bucket(&self.bucket)
            .create_bucket_configuration(configuration)
            .send()
            .await
            .or_service("CreateBucket")?;

        info!("Created directory bucket {} in {}", self.bucket, zone);
        Ok(())
    }

    pub async fn delete_bucket(&self) -> Result<()> {
        self.client
            .delete_bucket()
            .bucket(&self.bucket)
            .send()
            .await
            .or_service("DeleteBucket")?;

        info!("Deleted directory bucket {}", self.bucket);
        Ok(())
    }

    // =============================================================================
    // Objects
    // =============================================================================

    /// Uploads a small object in a single request and returns its ETag
    pub async fn put_object(&self, key: &str, body: Vec<u8>) -> Result<Option<String>> {
        let resp = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(body))
            .send()
            .await
            .or_service("PutObject")?;

        Ok(resp.e_tag().map(str::to_string))
    }

    pub async fn delete_object(&self, key: &str) -> Result<()> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .or_service("DeleteObject")?;

        info!("Deleted s3://{}/{}", self.bucket, key);
        Ok(())
    }

    // =============================================================================
    // Multipart sessions
    // =============================================================================

    /// Lists upload sessions left open in the bucket (first page)
    pub async fn list_multipart_uploads(&self) -> Result<Vec<PendingUpload>> {
        let resp = self
            .client
            .list_multipart_uploads()
            .bucket(&self.bucket)
            .send()
            .await
            .or_service("ListMultipartUploads")?;

        Ok(resp
            .uploads()
            .iter()
            .filter_map(|upload| {
                Some(PendingUpload {
                    key: upload.key()?.to_string(),
                    upload_id: upload.upload_id()?.to_string(),
                    initiated: upload
                        .initiated()
                        .and_then(|time| time.fmt(Format::DateTime).ok()),
                })
            })
            .collect())
    }
}

#[async_trait]
impl MultipartStore for DirectoryBucketClient {
    async fn create_upload(&self, key: &str) -> Result<String> {
        let resp = self
            .client
            .create_multipart_upload()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .or_service("CreateMultipartUpload")?;

        let upload_id = resp
            .upload_id()
            .ok_or_else(|| ClientError::missing("CreateMultipartUpload", "UploadId"))?;

        debug!("Created upload {} for s3://{}/{}", upload_id, self.bucket, key);
        Ok(upload_id.to_string())
    }

    async fn upload_part(
        &self,
        key: &str,
        upload_id: &str,
        number: i32,
        body: Vec<u8>,
    ) -> Result<CompletedPart> {
        let length = body.len();
        let resp = self
            .client
            .upload_part()
            .bucket(&self.bucket)
            .key(key)
            .upload_id(upload_id)
            .part_number(number)
            .body(ByteStream::from(body))
            .send()
            .await
            .or_service("UploadPart")?;

        let e_tag = resp
            .e_tag()
            .ok_or_else(|| ClientError::missing("UploadPart", "ETag"))?;

        debug!("Uploaded part {} ({} bytes) of {}", number, length, key);
        Ok(CompletedPart::new(number, e_tag))
    }

    async fn complete_upload(
        &self,
        key: &str,
        upload_id: &str,
        parts: &[CompletedPart],
    ) -> Result<()> {
        let completed = CompletedMultipartUpload::builder()
            .set_parts(Some(
                parts
                    .iter()
                    .map(|part| {
                        aws_sdk_s3::types::CompletedPart::builder()
                            .part_number(part.number)
                            .e_tag(&part.token)
                            .build()
                    })
                    .collect(),
            ))
            .build();

        self.client
            .complete_multipart_upload()
            .bucket(&self.bucket)
            .key(key)
            .upload_id(upload_id)
            .multipart_upload(completed)
            .send()
            .await
            .or_service("CompleteMultipartUpload")?;

        info!(
            "Completed upload of s3://{}/{} from {} part(s)",
            self.bucket,
            key,
            parts.len()
        );
        Ok(())
    }

    async fn abort_upload(&self, key: &str, upload_id: &str) -> Result<()> {
        self.client
            .abort_multipart_upload()
            .bucket(&self.bucket)
            .key(key)
            .upload_id(upload_id)
            .send()
            .await
            .or_service("AbortMultipartUpload")?;

        info!("Aborted upload {} of s3://{}/{}", upload_id, self.bucket, key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aws_sdk_s3::config::{BehaviorVersion, Region};

    fn client(bucket: &str) -> DirectoryBucketClient {
        let config = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new("us-west-2"))
            .build();
        DirectoryBucketClient::from_client(Client::from_conf(config), bucket)
    }

    #[test]
    fn test_zone_id_from_bucket_name() {
        assert_eq!(client("media--usw2-az1--x-s3").zone_id(), Some("usw2-az1"));
        assert_eq!(
            client("my--nested--name--use1-az4--x-s3").zone_id(),
            Some("use1-az4")
        );
    }

    #[test]
    fn test_zone_id_missing() {
        assert_eq!(client("general-purpose-bucket").zone_id(), None);
        assert_eq!(client("media----x-s3").zone_id(), None);
    }
}
