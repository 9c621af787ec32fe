//! Lookout for Vision projects, datasets and models

use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_lookoutvision::Client;
use aws_sdk_lookoutvision::primitives::Blob;
use aws_sdk_lookoutvision::types::{
    DatasetGroundTruthManifest, DatasetSource, InputS3Object, OutputConfig, S3Location,
};
use cirrus_core::domain::job::{JobHandle, Observation};
use cirrus_core::domain::status::{DatasetStatus, ModelStatus};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::ObjectLocation;
use crate::error::{ClientError, Result, ServiceResultExt};
use crate::source::JobStatusSource;

/// Description of a model version
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelSummary {
    pub version: String,
    pub status: ModelStatus,
    pub status_message: Option<String>,
    pub arn: Option<String>,
    pub description: Option<String>,
}

/// Description of a training or test dataset
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetSummary {
    pub dataset_type: String,
    pub status: DatasetStatus,
    pub status_message: Option<String>,
}

/// Lookout for Vision client
#[derive(Debug, Clone)]
pub struct LookoutVisionClient {
    client: Client,
}

impl LookoutVisionClient {
    pub fn new(config: &SdkConfig) -> Self {
        Self {
            client: Client::new(config),
        }
    }

    pub fn from_client(client: Client) -> Self {
        Self { client }
    }

    // =============================================================================
    // Projects
    // =============================================================================

    /// Creates a project and returns its ARN
    pub async fn create_project(&self, project: &str) -> Result<String> {
        let resp = self
            .client
            .create_project()
            .project_name(project)
            .send()
            .await
            .or_service("CreateProject")?;

        let arn = resp
            .project_metadata()
            .and_then(|meta| meta.project_arn())
            .ok_or_else(|| ClientError::missing("CreateProject", "ProjectMetadata.ProjectArn"))?;

        info!("Created project {} ({})", project, arn);
        Ok(arn.to_string())
    }

    // =============================================================================
    // Datasets
    // =============================================================================

    /// Creates a dataset from a SageMaker Ground Truth manifest stored in S3
    ///
    /// Dataset creation is asynchronous; poll with [`Self::dataset_status`]
    /// using the dataset type as handle.
    pub async fn create_dataset(
        &self,
        project: &str,
        dataset_type: &str,
        manifest: &ObjectLocation,
    ) -> Result<DatasetStatus> {
        let manifest_object = InputS3Object::builder()
            .bucket(&manifest.bucket)
            .key(&manifest.key)
            .build();

        let source = DatasetSource::builder()
            .ground_truth_manifest(
                DatasetGroundTruthManifest::builder()
                    .s3_object(manifest_object)
                    .build(),
            )
            .build();

        let resp = self
            .client
            .create_dataset()
            .project_name(project)
            .dataset_type(dataset_type)
            .dataset_source(source)
            .client_token(Uuid::new_v4().to_string())
            .send()
            .await
            .or_service("CreateDataset")?;

        let status = resp
            .dataset_metadata()
            .and_then(|meta| meta.status())
            .map(|status| DatasetStatus::from(status.as_str()))
            .ok_or_else(|| ClientError::missing("CreateDataset", "DatasetMetadata.Status"))?;

        info!(
            "Requested {} dataset for project {} from {} ({})",
            dataset_type, project, manifest, status
        );
        Ok(status)
    }

    pub async fn describe_dataset(&self, project: &str, dataset_type: &str) -> Result<DatasetSummary> {
        let resp = self
            .client
            .describe_dataset()
            .project_name(project)
            .dataset_type(dataset_type)
            .send()
            .await
            .or_service("DescribeDataset")?;

        let description = resp
            .dataset_description()
            .ok_or_else(|| ClientError::missing("DescribeDataset", "DatasetDescription"))?;

        let status = description
            .status()
            .map(|status| DatasetStatus::from(status.as_str()))
            .ok_or_else(|| ClientError::missing("DescribeDataset", "DatasetDescription.Status"))?;

        Ok(DatasetSummary {
            dataset_type: description
                .dataset_type()
                .unwrap_or(dataset_type)
                .to_string(),
            status,
            status_message: description.status_message().map(str::to_string),
        })
    }

    /// Adds or changes dataset entries from JSON Lines manifest content
    ///
    /// The update is asynchronous; poll [`Self::dataset_status`] with
    /// [`DatasetStatus::update`].
    pub async fn update_dataset_entries(
        &self,
        project: &str,
        dataset_type: &str,
        changes: Vec<u8>,
    ) -> Result<DatasetStatus> {
        let resp = self
            .client
            .update_dataset_entries()
            .project_name(project)
            .dataset_type(dataset_type)
            .changes(Blob::new(changes))
            .client_token(Uuid::new_v4().to_string())
            .send()
            .await
            .or_service("UpdateDatasetEntries")?;

        let status = resp
            .status()
            .map(|status| DatasetStatus::from(status.as_str()))
            .ok_or_else(|| ClientError::missing("UpdateDatasetEntries", "Status"))?;

        info!(
            "Updating {} dataset entries of project {} ({})",
            dataset_type, project, status
        );
        Ok(status)
    }

    pub async fn delete_dataset(&self, project: &str, dataset_type: &str) -> Result<()> {
        self.client
            .delete_dataset()
            .project_name(project)
            .dataset_type(dataset_type)
            .client_token(Uuid::new_v4().to_string())
            .send()
            .await
            .or_service("DeleteDataset")?;

        info!("Deleted {} dataset of project {}", dataset_type, project);
        Ok(())
    }

    // =============================================================================
    // Models
    // =============================================================================

    /// Starts training a new model version
    ///
    /// Training output is written under `output`. The returned summary
    /// carries the new version, which is the handle for
    /// [`Self::model_status`].
    pub async fn create_model(
        &self,
        project: &str,
        output: &ObjectLocation,
        description: Option<&str>,
    ) -> Result<ModelSummary> {
        let location = S3Location::builder()
            .bucket(&output.bucket)
            .prefix(&output.key)
            .build();
        let output_config = OutputConfig::builder().s3_location(location).build();

        let resp = self
            .client
            .create_model()
            .project_name(project)
            .output_config(output_config)
            .set_description(description.map(str::to_string))
            .client_token(Uuid::new_v4().to_string())
            .send()
            .await
            .or_service("CreateModel")?;

        let meta = resp
            .model_metadata()
            .ok_or_else(|| ClientError::missing("CreateModel", "ModelMetadata"))?;

        let summary = ModelSummary {
            version: meta
                .model_version()
                .ok_or_else(|| ClientError::missing("CreateModel", "ModelMetadata.ModelVersion"))?
                .to_string(),
            status: meta
                .status()
                .map(|status| ModelStatus::from(status.as_str()))
                .ok_or_else(|| ClientError::missing("CreateModel", "ModelMetadata.Status"))?,
            status_message: meta.status_message().map(str::to_string),
            arn: meta.model_arn().map(str::to_string),
            description: meta.description().map(str::to_string),
        };

        info!(
            "Started training model version {} of project {}",
            summary.version, project
        );
        Ok(summary)
    }

    pub async fn describe_model(&self, project: &str, version: &str) -> Result<ModelSummary> {
        let resp = self
            .client
            .describe_model()
            .project_name(project)
            .model_version(version)
            .send()
            .await
            .or_service("DescribeModel")?;

        let model = resp
            .model_description()
            .ok_or_else(|| ClientError::missing("DescribeModel", "ModelDescription"))?;

        Ok(ModelSummary {
            version: model.model_version().unwrap_or(version).to_string(),
            status: model
                .status()
                .map(|status| ModelStatus::from(status.as_str()))
                .ok_or_else(|| ClientError::missing("DescribeModel", "ModelDescription.Status"))?,
            status_message: model.status_message().map(str::to_string),
            arn: model.model_arn().map(str::to_string),
            description: model.description().map(str::to_string),
        })
    }

    /// Lists the model versions of a project (first page)
    pub async fn list_models(&self, project: &str) -> Result<Vec<ModelSummary>> {
        let resp = self
            .client
            .list_models()
            .project_name(project)
            .send()
            .await
            .or_service("ListModels")?;

        let models = resp
            .models()
            .iter()
            .filter_map(|meta| {
                Some(ModelSummary {
                    version: meta.model_version()?.to_string(),
                    status: ModelStatus::from(meta.status()?.as_str()),
                    status_message: meta.status_message().map(str::to_string),
                    arn: meta.model_arn().map(str::to_string),
                    description: meta.description().map(str::to_string),
                })
            })
            .collect::<Vec<_>>();

        debug!("Project {} has {} model(s)", project, models.len());
        Ok(models)
    }

    /// Starts hosting a model; poll with [`ModelStatus::hosting`]
    pub async fn start_model(
        &self,
        project: &str,
        version: &str,
        min_inference_units: i32,
    ) -> Result<ModelStatus> {
        let resp = self
            .client
            .start_model()
            .project_name(project)
            .model_version(version)
            .min_inference_units(min_inference_units)
            .client_token(Uuid::new_v4().to_string())
            .send()
            .await
            .or_service("StartModel")?;

        let status = resp
            .status()
            .map(|status| ModelStatus::from(status.as_str()))
            .ok_or_else(|| ClientError::missing("StartModel", "Status"))?;

        info!("Starting model {} of project {} ({})", version, project, status);
        Ok(status)
    }

    /// Stops hosting a model; poll with [`ModelStatus::stopping`]
    pub async fn stop_model(&self, project: &str, version: &str) -> Result<ModelStatus> {
        let resp = self
            .client
            .stop_model()
            .project_name(project)
            .model_version(version)
            .client_token(Uuid::new_v4().to_string())
            .send()
            .await
            .or_service("StopModel")?;

        let status = resp
            .status()
            .map(|status| ModelStatus::from(status.as_str()))
            .ok_or_else(|| ClientError::missing("StopModel", "Status"))?;

        info!("Stopping model {} of project {} ({})", version, project, status);
        Ok(status)
    }

    pub async fn delete_model(&self, project: &str, version: &str) -> Result<()> {
        self.client
            .delete_model()
            .project_name(project)
            .model_version(version)
            .client_token(Uuid::new_v4().to_string())
            .send()
            .await
            .or_service("DeleteModel")?;

        info!("Deleted model {} of project {}", version, project);
        Ok(())
    }

    // =============================================================================
    // Status sources
    // =============================================================================

    /// Status source for the model versions of `project` (handle: model version)
    pub fn model_status(&self, project: impl Into<String>) -> ModelStatusSource {
        ModelStatusSource {
            client: self.clone(),
            project: project.into(),
        }
    }

    /// Status source for the datasets of `project` (handle: dataset type)
    pub fn dataset_status(&self, project: impl Into<String>) -> DatasetStatusSource {
        DatasetStatusSource {
            client: self.clone(),
            project: project.into(),
        }
    }
}

/// Polls `DescribeModel`
#[derive(Debug, Clone)]
pub struct ModelStatusSource {
    client: LookoutVisionClient,
    project: String,
}

#[async_trait]
impl JobStatusSource for ModelStatusSource {
    type Status = ModelStatus;
    type Payload = ModelSummary;

    async fn fetch_status(&self, handle: &JobHandle) -> Result<Observation<ModelStatus, ModelSummary>> {
        let model = self
            .client
            .describe_model(&self.project, handle.as_str())
            .await?;
        Ok(Observation::new(model.status.clone(), model))
    }
}

/// Polls `DescribeDataset`
#[derive(Debug, Clone)]
pub struct DatasetStatusSource {
    client: LookoutVisionClient,
    project: String,
}

#[async_trait]
impl JobStatusSource for DatasetStatusSource {
    type Status = DatasetStatus;
    type Payload = DatasetSummary;

    async fn fetch_status(
        &self,
        handle: &JobHandle,
    ) -> Result<Observation<DatasetStatus, DatasetSummary>> {
        let dataset = self
            .client
            .describe_dataset(&self.project, handle.as_str())
            .await?;
        Ok(Observation::new(dataset.status.clone(), dataset))
    }
}
