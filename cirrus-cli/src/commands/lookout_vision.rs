//! Lookout for Vision command handlers
//!
//! Handles projects, datasets and models. Dataset creation, model training,
//! hosting and stopping are asynchronous and are waited on.

use anyhow::{Context, Result};
use cirrus_client::lookout_vision::{DatasetSummary, ModelSummary};
use cirrus_client::{LookoutVisionClient, ObjectLocation, load_sdk_config};
use cirrus_core::domain::job::JobHandle;
use cirrus_core::domain::status::{DatasetStatus, ModelStatus};
use clap::Subcommand;
use colored::*;
use std::path::{Path, PathBuf};

use super::{ensure_succeeded, wait_for};
use crate::config::Config;

/// Lookout for Vision subcommands
#[derive(Subcommand)]
pub enum LookoutVisionCommands {
    /// Create a project
    CreateProject {
        /// Project name
        project: String,
    },
    /// Create a dataset from a Ground Truth manifest and wait until it is ready
    CreateDataset {
        /// Project name
        project: String,

        /// Manifest location, e.g. s3://bucket/path/train.manifest
        #[arg(long)]
        manifest: String,

        /// Dataset type (train or test)
        #[arg(long, default_value = "train")]
        dataset_type: String,
    },
    /// Show a dataset's status
    DescribeDataset {
        /// Project name
        project: String,

        /// Dataset type (train or test)
        #[arg(long, default_value = "train")]
        dataset_type: String,
    },
    /// Add or change dataset entries from a local JSON Lines manifest and wait for the update
    UpdateDataset {
        /// Project name
        project: String,

        /// Local manifest file with the changed entries
        #[arg(long)]
        changes: PathBuf,

        /// Dataset type (train or test)
        #[arg(long, default_value = "train")]
        dataset_type: String,
    },
    /// Delete a dataset
    DeleteDataset {
        /// Project name
        project: String,

        /// Dataset type (train or test)
        #[arg(long, default_value = "train")]
        dataset_type: String,
    },
    /// Train a new model version and wait for training to finish
    CreateModel {
        /// Project name
        project: String,

        /// Training output location, e.g. s3://bucket/output/
        #[arg(long)]
        output: String,

        /// Model description
        #[arg(long)]
        description: Option<String>,
    },
    /// Show a model's status
    DescribeModel {
        /// Project name
        project: String,

        /// Model version
        version: String,
    },
    /// List the models of a project
    ListModels {
        /// Project name
        project: String,
    },
    /// Host a model and wait until it is ready for inference
    StartModel {
        /// Project name
        project: String,

        /// Model version
        version: String,

        /// Minimum number of inference units
        #[arg(long, default_value_t = 1)]
        min_inference_units: i32,
    },
    /// Stop hosting a model and wait until it is stopped
    StopModel {
        /// Project name
        project: String,

        /// Model version
        version: String,
    },
    /// Delete a model
    DeleteModel {
        /// Project name
        project: String,

        /// Model version
        version: String,
    },
}

/// Handle Lookout for Vision commands
///
/// # Arguments
/// * `command` - The Lookout for Vision command to execute
/// * `config` - The CLI configuration
pub async fn handle_lookout_vision_command(
    command: LookoutVisionCommands,
    config: &Config,
) -> Result<()> {
    let sdk_config = load_sdk_config(config.region.clone()).await;
    let client = LookoutVisionClient::new(&sdk_config);

    match command {
        LookoutVisionCommands::CreateProject { project } => {
            let arn = client
                .create_project(&project)
                .await
                .with_context(|| format!("Failed to create project {}", project))?;
            println!("{} Created project {}", "✓".green(), project.bold());
            println!("    ARN: {}", arn.dimmed());
            Ok(())
        }
        LookoutVisionCommands::CreateDataset {
            project,
            manifest,
            dataset_type,
        } => create_dataset(&client, config, &project, &manifest, &dataset_type).await,
        LookoutVisionCommands::DescribeDataset {
            project,
            dataset_type,
        } => {
            let dataset = client.describe_dataset(&project, &dataset_type).await?;
            print_dataset(&dataset);
            Ok(())
        }
        LookoutVisionCommands::UpdateDataset {
            project,
            changes,
            dataset_type,
        } => update_dataset(&client, config, &project, &changes, &dataset_type).await,
        LookoutVisionCommands::DeleteDataset {
            project,
            dataset_type,
        } => {
            client.delete_dataset(&project, &dataset_type).await?;
            println!(
                "{} Deleted {} dataset of project {}",
                "✓".green(),
                dataset_type,
                project.bold()
            );
            Ok(())
        }
        LookoutVisionCommands::CreateModel {
            project,
            output,
            description,
        } => create_model(&client, config, &project, &output, description.as_deref()).await,
        LookoutVisionCommands::DescribeModel { project, version } => {
            let model = client.describe_model(&project, &version).await?;
            print_model(&model);
            Ok(())
        }
        LookoutVisionCommands::ListModels { project } => list_models(&client, &project).await,
        LookoutVisionCommands::StartModel {
            project,
            version,
            min_inference_units,
        } => {
            client
                .start_model(&project, &version, min_inference_units)
                .await?;
            let report = wait_for(
                client.model_status(&project),
                ModelStatus::hosting,
                &JobHandle::new(version.as_str()),
                &format!("model {}", version),
                config,
            )
            .await?;
            ensure_succeeded(
                &report,
                &format!("Model {}", version),
                report.outcome.payload().status_message.as_deref(),
            )
        }
        LookoutVisionCommands::StopModel { project, version } => {
            client.stop_model(&project, &version).await?;
            let report = wait_for(
                client.model_status(&project),
                ModelStatus::stopping,
                &JobHandle::new(version.as_str()),
                &format!("model {}", version),
                config,
            )
            .await?;
            ensure_succeeded(
                &report,
                &format!("Model {}", version),
                report.outcome.payload().status_message.as_deref(),
            )
        }
        LookoutVisionCommands::DeleteModel { project, version } => {
            client.delete_model(&project, &version).await?;
            println!(
                "{} Deleted model {} of project {}",
                "✓".green(),
                version,
                project.bold()
            );
            Ok(())
        }
    }
}

async fn create_dataset(
    client: &LookoutVisionClient,
    config: &Config,
    project: &str,
    manifest: &str,
    dataset_type: &str,
) -> Result<()> {
    let manifest = ObjectLocation::parse(manifest)?;
    client
        .create_dataset(project, dataset_type, &manifest)
        .await
        .with_context(|| format!("Failed to create {} dataset", dataset_type))?;

    let what = format!("{} dataset", dataset_type);
    let report = wait_for(
        client.dataset_status(project),
        DatasetStatus::creation,
        &JobHandle::new(dataset_type),
        &what,
        config,
    )
    .await?;

    ensure_succeeded(
        &report,
        &what,
        report.outcome.payload().status_message.as_deref(),
    )
}

async fn update_dataset(
    client: &LookoutVisionClient,
    config: &Config,
    project: &str,
    changes: &Path,
    dataset_type: &str,
) -> Result<()> {
    let body = tokio::fs::read(changes)
        .await
        .with_context(|| format!("Failed to read {}", changes.display()))?;
    client
        .update_dataset_entries(project, dataset_type, body)
        .await
        .with_context(|| format!("Failed to update {} dataset", dataset_type))?;

    let what = format!("{} dataset", dataset_type);
    let report = wait_for(
        client.dataset_status(project),
        DatasetStatus::update,
        &JobHandle::new(dataset_type),
        &what,
        config,
    )
    .await?;

    ensure_succeeded(
        &report,
        &what,
        report.outcome.payload().status_message.as_deref(),
    )?;
    print_dataset(report.outcome.payload());
    Ok(())
}

async fn create_model(
    client: &LookoutVisionClient,
    config: &Config,
    project: &str,
    output: &str,
    description: Option<&str>,
) -> Result<()> {
    let output = ObjectLocation::parse(output)?;
    let model = client
        .create_model(project, &output, description)
        .await
        .with_context(|| format!("Failed to create a model in project {}", project))?;

    println!(
        "{} Training model version {} of project {}",
        "▸".cyan(),
        model.version.bold(),
        project
    );

    let what = format!("model {}", model.version);
    let report = wait_for(
        client.model_status(project),
        ModelStatus::training,
        &JobHandle::new(model.version.as_str()),
        &what,
        config,
    )
    .await?;

    ensure_succeeded(
        &report,
        &format!("Model {}", model.version),
        report.outcome.payload().status_message.as_deref(),
    )?;
    print_model(report.outcome.payload());
    Ok(())
}

async fn list_models(client: &LookoutVisionClient, project: &str) -> Result<()> {
    let models = client.list_models(project).await?;

    if models.is_empty() {
        println!("{}", format!("No models found in project {}.", project).yellow());
    } else {
        println!("{}", format!("Found {} model(s):", models.len()).bold());
        println!();
        for model in models {
            print_model(&model);
        }
    }

    Ok(())
}

/// Print a model summary
fn print_model(model: &ModelSummary) {
    println!("  {} Model {}", "▸".cyan(), model.version.bold());
    println!("    Status:      {}", model.status.to_string().bold());
    if let Some(message) = &model.status_message {
        println!("    Message:     {}", message.dimmed());
    }
    if let Some(description) = &model.description {
        println!("    Description: {}", description);
    }
    if let Some(arn) = &model.arn {
        println!("    ARN:         {}", arn.dimmed());
    }
    println!();
}

/// Print a dataset summary
fn print_dataset(dataset: &DatasetSummary) {
    println!("  {} Dataset {}", "▸".cyan(), dataset.dataset_type.bold());
    println!("    Status:  {}", dataset.status.to_string().bold());
    if let Some(message) = &dataset.status_message {
        println!("    Message: {}", message.dimmed());
    }
    println!();
}
