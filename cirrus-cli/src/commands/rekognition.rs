//! Rekognition command handlers
//!
//! Handles stored-video label detection and Custom Labels model hosting.

use anyhow::{Context, Result};
use cirrus_client::{ObjectLocation, RekognitionClient, load_sdk_config};
use cirrus_core::domain::job::{JobHandle, StatusClass};
use cirrus_core::domain::status::{ProjectVersionStatus, VideoJobStatus};
use clap::Subcommand;
use colored::*;

use super::{ensure_succeeded, wait_for};
use crate::config::Config;

/// Rekognition subcommands
#[derive(Subcommand)]
pub enum RekognitionCommands {
    /// Detect labels in a stored video, wait for the job and print the labels
    DetectLabels {
        /// Video location, e.g. s3://bucket/video.mp4
        video: String,

        /// Minimum confidence (0-100) of the returned labels
        #[arg(long)]
        min_confidence: Option<f32>,
    },
    /// Train a Custom Labels model version and wait for training to finish
    CreateVersion {
        /// Project ARN
        project_arn: String,

        /// Version name
        version_name: String,

        /// Training output location, e.g. s3://bucket/output/
        #[arg(long)]
        output: String,
    },
    /// Show the status of a Custom Labels model version
    DescribeVersion {
        /// Project ARN
        project_arn: String,

        /// Version name
        version_name: String,
    },
    /// Start a Custom Labels model version and wait until it is running
    StartVersion {
        /// Project ARN
        project_arn: String,

        /// Version name
        version_name: String,

        /// Minimum number of inference units
        #[arg(long, default_value_t = 1)]
        min_inference_units: i32,
    },
    /// Stop a Custom Labels model version and wait until it is stopped
    StopVersion {
        /// Project ARN
        project_arn: String,

        /// Version name
        version_name: String,
    },
}

/// Handle Rekognition commands
///
/// # Arguments
/// * `command` - The Rekognition command to execute
/// * `config` - The CLI configuration
pub async fn handle_rekognition_command(
    command: RekognitionCommands,
    config: &Config,
) -> Result<()> {
    let sdk_config = load_sdk_config(config.region.clone()).await;
    let client = RekognitionClient::new(&sdk_config);

    match command {
        RekognitionCommands::DetectLabels {
            video,
            min_confidence,
        } => detect_labels(&client, config, &video, min_confidence).await,
        RekognitionCommands::CreateVersion {
            project_arn,
            version_name,
            output,
        } => {
            let output = ObjectLocation::parse(&output)?;
            let arn = client
                .create_project_version(&project_arn, &version_name, &output)
                .await
                .with_context(|| format!("Failed to create version {}", version_name))?;
            println!("{} Training version {}", "▸".cyan(), version_name.bold());
            println!("    ARN: {}", arn.dimmed());

            wait_for_version(
                &client,
                config,
                &project_arn,
                &version_name,
                ProjectVersionStatus::training,
            )
            .await
        }
        RekognitionCommands::DescribeVersion {
            project_arn,
            version_name,
        } => {
            let version = client
                .describe_project_version(&project_arn, &version_name)
                .await?;
            println!("  {} Version {}", "▸".cyan(), version_name.bold());
            println!("    Status:  {}", version.status.to_string().bold());
            if let Some(message) = &version.status_message {
                println!("    Message: {}", message.dimmed());
            }
            println!("    ARN:     {}", version.arn.dimmed());
            Ok(())
        }
        RekognitionCommands::StartVersion {
            project_arn,
            version_name,
            min_inference_units,
        } => {
            let version = client
                .describe_project_version(&project_arn, &version_name)
                .await?;
            client
                .start_project_version(&version.arn, min_inference_units)
                .await
                .with_context(|| format!("Failed to start version {}", version_name))?;

            wait_for_version(
                &client,
                config,
                &project_arn,
                &version_name,
                ProjectVersionStatus::running,
            )
            .await
        }
        RekognitionCommands::StopVersion {
            project_arn,
            version_name,
        } => {
            let version = client
                .describe_project_version(&project_arn, &version_name)
                .await?;
            client
                .stop_project_version(&version.arn)
                .await
                .with_context(|| format!("Failed to stop version {}", version_name))?;

            wait_for_version(
                &client,
                config,
                &project_arn,
                &version_name,
                ProjectVersionStatus::stopping,
            )
            .await
        }
    }
}

async fn detect_labels(
    client: &RekognitionClient,
    config: &Config,
    video: &str,
    min_confidence: Option<f32>,
) -> Result<()> {
    let video = ObjectLocation::parse(video)?;
    let handle = client
        .start_label_detection(&video, min_confidence)
        .await
        .with_context(|| format!("Failed to start label detection on {}", video))?;

    println!("{} Started label detection job {}", "▸".cyan(), handle.as_str().bold());

    let what = format!("label detection job {}", handle);
    let report = wait_for(
        client.label_detection(),
        VideoJobStatus::completion,
        &handle,
        &what,
        config,
    )
    .await?;
    ensure_succeeded(
        &report,
        "Label detection",
        report.outcome.payload().status_message.as_deref(),
    )?;

    let labels = client.label_counts(handle.as_str()).await?;
    if labels.is_empty() {
        println!("{}", "No labels detected.".yellow());
    } else {
        println!("{}", format!("Detected {} label(s):", labels.len()).bold());
        println!();
        for (name, occurrences) in &labels {
            println!("  {} {} {}", "▸".cyan(), name, format!("x{}", occurrences).dimmed());
        }
    }

    Ok(())
}

async fn wait_for_version(
    client: &RekognitionClient,
    config: &Config,
    project_arn: &str,
    version_name: &str,
    classify: fn(&ProjectVersionStatus) -> StatusClass,
) -> Result<()> {
    let what = format!("version {}", version_name);
    let report = wait_for(
        client.project_version(project_arn),
        classify,
        &JobHandle::new(version_name),
        &what,
        config,
    )
    .await?;

    ensure_succeeded(
        &report,
        &format!("Version {}", version_name),
        report.outcome.payload().status_message.as_deref(),
    )
}
