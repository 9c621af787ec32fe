//! Rekognition stored-video label detection and Custom Labels project versions

use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_rekognition::Client;
use aws_sdk_rekognition::types::{OutputConfig, S3Object, Video};
use cirrus_core::domain::job::{JobHandle, Observation};
use cirrus_core::domain::status::{ProjectVersionStatus, VideoJobStatus};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info};
use uuid::Uuid;

use crate::ObjectLocation;
use crate::error::{ClientError, Result, ServiceResultExt};
use crate::source::JobStatusSource;

/// Largest page `GetLabelDetection` accepts
const LABEL_PAGE_SIZE: i32 = 1000;

/// Status of a label detection job as returned with its first page
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabelJobSummary {
    pub job_id: String,
    pub status: VideoJobStatus,
    pub status_message: Option<String>,
}

/// Description of a Custom Labels project version
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectVersionSummary {
    pub arn: String,
    pub status: ProjectVersionStatus,
    pub status_message: Option<String>,
}

/// Rekognition client
#[derive(Debug, Clone)]
pub struct RekognitionClient {
    client: Client,
}

impl RekognitionClient {
    pub fn new(config: &SdkConfig) -> Self {
        Self {
            client: Client::new(config),
        }
    }

    pub fn from_client(client: Client) -> Self {
        Self { client }
    }

    // =============================================================================
    // Stored video label detection
    // =============================================================================

    /// Starts label detection on a video stored in S3 and returns the job handle
    pub async fn start_label_detection(
        &self,
        video: &ObjectLocation,
        min_confidence: Option<f32>,
    ) -> Result<JobHandle> {
        let video = Video::builder()
            .s3_object(
                S3Object::builder()
                    .bucket(&video.bucket)
                    .name(&video.key)
                    .build(),
            )
            .build();

        let resp = self
            .client
            .start_label_detection()
            .video(video)
            .set_min_confidence(min_confidence)
            .client_request_token(Uuid::new_v4().to_string())
            .send()
            .await
            .or_service("StartLabelDetection")?;

        let job_id = resp
            .job_id()
            .ok_or_else(|| ClientError::missing("StartLabelDetection", "JobId"))?;

        info!("Started label detection job {}", job_id);
        Ok(JobHandle::new(job_id))
    }

    /// Fetches the job status without pulling labels
    pub async fn label_detection_status(&self, job_id: &str) -> Result<LabelJobSummary> {
        let resp = self
            .client
            .get_label_detection()
            .job_id(job_id)
            .max_results(1)
            .send()
            .await
            .or_service("GetLabelDetection")?;

        let status = resp
            .job_status()
            .map(|status| VideoJobStatus::from(status.as_str()))
            .ok_or_else(|| ClientError::missing("GetLabelDetection", "JobStatus"))?;

        Ok(LabelJobSummary {
            job_id: job_id.to_string(),
            status,
            status_message: resp.status_message().map(str::to_string),
        })
    }

    /// Collects every detected label of a finished job, counted by name
    pub async fn label_counts(&self, job_id: &str) -> Result<BTreeMap<String, usize>> {
        let mut counts = BTreeMap::new();
        let mut next_token: Option<String> = None;
        let mut pages = 0;

        loop {
            let resp = self
                .client
                .get_label_detection()
                .job_id(job_id)
                .max_results(LABEL_PAGE_SIZE)
                .set_next_token(next_token.take())
                .send()
                .await
                .or_service("GetLabelDetection")?;
            pages += 1;

            for detection in resp.labels() {
                if let Some(name) = detection.label().and_then(|label| label.name()) {
                    *counts.entry(name.to_string()).or_insert(0) += 1;
                }
            }

            match resp.next_token() {
                Some(token) if !token.is_empty() => next_token = Some(token.to_string()),
                _ => break,
            }
        }

        debug!(
            "Read {} distinct label(s) for job {} in {} page(s)",
            counts.len(),
            job_id,
            pages
        );
        Ok(counts)
    }

    /// Status source for label detection jobs (handle: job id)
    pub fn label_detection(&self) -> LabelDetectionSource {
        LabelDetectionSource {
            client: self.clone(),
        }
    }

    // =============================================================================
    // Custom Labels project versions
    // =============================================================================

    pub async fn describe_project_version(
        &self,
        project_arn: &str,
        version_name: &str,
    ) -> Result<ProjectVersionSummary> {
        let resp = self
            .client
            .describe_project_versions()
            .project_arn(project_arn)
            .version_names(version_name)
            .send()
            .await
            .or_service("DescribeProjectVersions")?;

        let version = resp.project_version_descriptions().first().ok_or_else(|| {
            ClientError::Service {
                operation: "DescribeProjectVersions",
                code: Some("ResourceNotFoundException".to_string()),
                message: format!("no version {} in project {}", version_name, project_arn),
            }
        })?;

        Ok(ProjectVersionSummary {
            arn: version
                .project_version_arn()
                .ok_or_else(|| {
                    ClientError::missing("DescribeProjectVersions", "ProjectVersionArn")
                })?
                .to_string(),
            status: version
                .status()
                .map(|status| ProjectVersionStatus::from(status.as_str()))
                .ok_or_else(|| ClientError::missing("DescribeProjectVersions", "Status"))?,
            status_message: version.status_message().map(str::to_string),
        })
    }

    /// Starts training a new version from the project's datasets
    ///
    /// Returns the version ARN. Training results are written under `output`;
    /// poll with [`ProjectVersionStatus::training`] using the version name.
    pub async fn create_project_version(
        &self,
        project_arn: &str,
        version_name: &str,
        output: &ObjectLocation,
    ) -> Result<String> {
        let output_config = OutputConfig::builder()
            .s3_bucket(&output.bucket)
            .s3_key_prefix(&output.key)
            .build();

        let resp = self
            .client
            .create_project_version()
            .project_arn(project_arn)
            .version_name(version_name)
            .output_config(output_config)
            .send()
            .await
            .or_service("CreateProjectVersion")?;

        let arn = resp
            .project_version_arn()
            .ok_or_else(|| ClientError::missing("CreateProjectVersion", "ProjectVersionArn"))?;

        info!("Training project version {} ({})", version_name, arn);
        Ok(arn.to_string())
    }

    /// Starts a trained model; poll with [`ProjectVersionStatus::running`]
    pub async fn start_project_version(
        &self,
        version_arn: &str,
        min_inference_units: i32,
    ) -> Result<ProjectVersionStatus> {
        let resp = self
            .client
            .start_project_version()
            .project_version_arn(version_arn)
            .min_inference_units(min_inference_units)
            .send()
            .await
            .or_service("StartProjectVersion")?;

        let status = resp
            .status()
            .map(|status| ProjectVersionStatus::from(status.as_str()))
            .ok_or_else(|| ClientError::missing("StartProjectVersion", "Status"))?;

        info!("Starting project version {} ({})", version_arn, status);
        Ok(status)
    }

    /// Stops a running model; poll with [`ProjectVersionStatus::stopping`]
    pub async fn stop_project_version(&self, version_arn: &str) -> Result<ProjectVersionStatus> {
        let resp = self
            .client
            .stop_project_version()
            .project_version_arn(version_arn)
            .send()
            .await
            .or_service("StopProjectVersion")?;

        let status = resp
            .status()
            .map(|status| ProjectVersionStatus::from(status.as_str()))
            .ok_or_else(|| ClientError::missing("StopProjectVersion", "Status"))?;

        info!("Stopping project version {} ({})", version_arn, status);
        Ok(status)
    }

    /// Status source for the versions of `project_arn` (handle: version name)
    pub fn project_version(&self, project_arn: impl Into<String>) -> ProjectVersionSource {
        ProjectVersionSource {
            client: self.clone(),
            project_arn: project_arn.into(),
        }
    }
}

/// Polls `GetLabelDetection`
#[derive(Debug, Clone)]
pub struct LabelDetectionSource {
    client: RekognitionClient,
}

#[async_trait]
impl JobStatusSource for LabelDetectionSource {
    type Status = VideoJobStatus;
    type Payload = LabelJobSummary;

    async fn fetch_status(
        &self,
        handle: &JobHandle,
    ) -> Result<Observation<VideoJobStatus, LabelJobSummary>> {
        let job = self.client.label_detection_status(handle.as_str()).await?;
        Ok(Observation::new(job.status.clone(), job))
    }
}

/// Polls `DescribeProjectVersions`
#[derive(Debug, Clone)]
pub struct ProjectVersionSource {
    client: RekognitionClient,
    project_arn: String,
}

#[async_trait]
impl JobStatusSource for ProjectVersionSource {
    type Status = ProjectVersionStatus;
    type Payload = ProjectVersionSummary;

    async fn fetch_status(
        &self,
        handle: &JobHandle,
    ) -> Result<Observation<ProjectVersionStatus, ProjectVersionSummary>> {
        let version = self
            .client
            .describe_project_version(&self.project_arn, handle.as_str())
            .await?;
        Ok(Observation::new(version.status.clone(), version))
    }
}
