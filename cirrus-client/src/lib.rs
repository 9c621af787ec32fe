//! Cirrus Client
//!
//! The cloud service side of Cirrus: async traits the runner polls and
//! uploads through, and their implementations on top of the AWS SDK for Rust.
//!
//! - [`JobStatusSource`]: fetches the status of an asynchronous job by handle
//! - [`MultipartStore`]: creates, fills, completes and aborts multipart uploads
//!
//! # Example
//!
//! ```no_run
//! use cirrus_client::{JobStatusSource, LookoutVisionClient, load_sdk_config};
//! use cirrus_core::domain::job::JobHandle;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), cirrus_client::ClientError> {
//!     let config = load_sdk_config(None).await;
//!     let client = LookoutVisionClient::new(&config);
//!
//!     let source = client.model_status("my-project");
//!     let observation = source.fetch_status(&JobHandle::new("1")).await?;
//!     println!("Model status: {}", observation.status);
//!     Ok(())
//! }
//! ```

pub mod autoscaling;
pub mod error;
pub mod lookout_vision;
pub mod rekognition;
pub mod s3;
mod source;

// Re-export commonly used types
pub use autoscaling::{AutoScalingClient, CapacityDimension};
pub use error::{ClientError, Result};
pub use lookout_vision::{DatasetStatusSource, LookoutVisionClient, ModelStatusSource};
pub use rekognition::{LabelDetectionSource, ProjectVersionSource, RekognitionClient};
pub use s3::DirectoryBucketClient;
pub use source::{JobStatusSource, MultipartStore};

use aws_config::meta::region::RegionProviderChain;
use aws_config::{BehaviorVersion, Region, SdkConfig};
use serde::{Deserialize, Serialize};

/// Region used when neither the caller nor the environment names one
pub const FALLBACK_REGION: &str = "us-west-2";

/// Loads the shared SDK configuration
///
/// The region is taken from `region` if given, otherwise from the default
/// provider chain (`AWS_REGION`, profile, ...), otherwise [`FALLBACK_REGION`].
pub async fn load_sdk_config(region: Option<String>) -> SdkConfig {
    let region_provider = RegionProviderChain::first_try(region.map(Region::new))
        .or_default_provider()
        .or_else(Region::new(FALLBACK_REGION));

    aws_config::defaults(BehaviorVersion::latest())
        .region(region_provider)
        .load()
        .await
}

/// Bucket and key of an object in S3
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectLocation {
    pub bucket: String,
    pub key: String,
}

impl ObjectLocation {
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
        }
    }

    /// Parses `s3://bucket/key`
    ///
    /// The key may be empty (a bucket root or prefix), the bucket may not.
    pub fn parse(uri: &str) -> Result<Self> {
        let rest = uri
            .strip_prefix("s3://")
            .ok_or_else(|| ClientError::InvalidRequest(format!("not an s3:// URI: {}", uri)))?;

        let (bucket, key) = rest.split_once('/').unwrap_or((rest, ""));
        if bucket.is_empty() {
            return Err(ClientError::InvalidRequest(format!(
                "missing bucket in URI: {}",
                uri
            )));
        }

        Ok(Self::new(bucket, key))
    }
}

impl std::fmt::Display for ObjectLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "s3://{}/{}", self.bucket, self.key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_object_location() {
        let location = ObjectLocation::parse("s3://my-bucket/path/to/manifest.json").unwrap();
        assert_eq!(location.bucket, "my-bucket");
        assert_eq!(location.key, "path/to/manifest.json");
        assert_eq!(location.to_string(), "s3://my-bucket/path/to/manifest.json");
    }

    #[test]
    fn test_parse_bucket_only() {
        let location = ObjectLocation::parse("s3://my-bucket").unwrap();
        assert_eq!(location.bucket, "my-bucket");
        assert_eq!(location.key, "");
    }

    #[test]
    fn test_parse_rejects_bad_uris() {
        assert!(ObjectLocation::parse("https://my-bucket/key").is_err());
        assert!(ObjectLocation::parse("s3:///key").is_err());
    }

    #[tokio::test]
    async fn test_load_sdk_config_uses_explicit_region() {
        let config = load_sdk_config(Some("eu-central-1".to_string())).await;
        assert_eq!(config.region().map(|r| r.as_ref()), Some("eu-central-1"));
    }
}
