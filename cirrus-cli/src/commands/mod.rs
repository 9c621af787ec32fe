//! Commands module
//!
//! Defines all CLI commands and their handlers, one module per service.

pub mod autoscaling;
pub mod lookout_vision;
pub mod rekognition;
pub mod s3;

pub use autoscaling::AutoScalingCommands;
pub use lookout_vision::LookoutVisionCommands;
pub use rekognition::RekognitionCommands;
pub use s3::S3Commands;

use anyhow::{Context, Result, bail};
use cirrus_client::JobStatusSource;
use cirrus_core::domain::job::{JobHandle, PollOutcome, PollReport, StatusClass};
use cirrus_runner::JobPoller;
use clap::Subcommand;
use colored::*;
use std::fmt::{Debug, Display};
use tracing::{info, warn};

use crate::config::Config;

/// Top-level CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Amazon Lookout for Vision projects, datasets and models
    LookoutVision {
        #[command(subcommand)]
        command: LookoutVisionCommands,
    },
    /// Amazon Rekognition video analysis and Custom Labels models
    Rekognition {
        #[command(subcommand)]
        command: RekognitionCommands,
    },
    /// Amazon S3 directory buckets and multipart uploads
    S3 {
        #[command(subcommand)]
        command: S3Commands,
    },
    /// Application Auto Scaling for DynamoDB tables
    Autoscaling {
        #[command(subcommand)]
        command: AutoScalingCommands,
    },
}

/// Handle a CLI command
///
/// Routes the command to the appropriate service module.
///
/// # Arguments
/// * `command` - The command to execute
/// * `config` - The CLI configuration
pub async fn handle_command(command: Commands, config: &Config) -> Result<()> {
    match command {
        Commands::LookoutVision { command } => {
            lookout_vision::handle_lookout_vision_command(command, config).await
        }
        Commands::Rekognition { command } => {
            rekognition::handle_rekognition_command(command, config).await
        }
        Commands::S3 { command } => s3::handle_s3_command(command, config).await,
        Commands::Autoscaling { command } => {
            autoscaling::handle_autoscaling_command(command, config).await
        }
    }
}

/// Polls a job until it settles, printing progress
pub(crate) async fn wait_for<Src, F>(
    source: Src,
    classify: F,
    handle: &JobHandle,
    what: &str,
    config: &Config,
) -> Result<PollReport<Src::Status, Src::Payload>>
where
    Src: JobStatusSource,
    Src::Status: Debug,
    F: Fn(&Src::Status) -> StatusClass,
{
    println!(
        "{} Waiting for {} (checking every {}s)...",
        "…".dimmed(),
        what,
        config.poll.interval.as_secs()
    );

    let report = JobPoller::new(source, classify, config.poll.clone())
        .poll(handle)
        .await
        .with_context(|| format!("Failed while waiting for {}", what))?;

    match report.outcome.class() {
        StatusClass::Succeeded => info!(
            "Finished waiting for {} after {} check(s)",
            what, report.attempts
        ),
        class => warn!("Finished waiting for {} with a {} outcome", what, class),
    }

    Ok(report)
}

/// Turns a failed or unrecognized outcome into an error
///
/// `detail` is the service's status message, if it sent one.
pub(crate) fn ensure_succeeded<S: Display, P>(
    report: &PollReport<S, P>,
    what: &str,
    detail: Option<&str>,
) -> Result<()> {
    let elapsed = report.elapsed().num_seconds();

    match &report.outcome {
        PollOutcome::Succeeded { status, .. } => {
            println!(
                "{} {} {} after {} check(s), {}s",
                "✓".green(),
                what,
                colorize_class(StatusClass::Succeeded, status),
                report.attempts,
                elapsed
            );
            Ok(())
        }
        PollOutcome::Failed { status, .. } => {
            println!("{} {} {}", "✗".red(), what, colorize_class(StatusClass::Failed, status));
            print_detail(detail);
            bail!("{} failed with status {}", what, status)
        }
        PollOutcome::Unknown { status, .. } => {
            println!(
                "{} {} {}",
                "?".yellow(),
                what,
                colorize_class(StatusClass::Unknown, status)
            );
            print_detail(detail);
            bail!("{} stopped on unexpected status {}", what, status)
        }
    }
}

fn print_detail(detail: Option<&str>) {
    if let Some(detail) = detail {
        println!("    {}", detail.dimmed());
    }
}

/// Colorize a status for display using the class it falls in
fn colorize_class(class: StatusClass, status: &impl Display) -> ColoredString {
    let text = status.to_string();
    match class {
        StatusClass::Pending => text.yellow(),
        StatusClass::Succeeded => text.green(),
        StatusClass::Failed => text.red(),
        StatusClass::Unknown => text.magenta(),
    }
}
