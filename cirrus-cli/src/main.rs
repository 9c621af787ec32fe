//! Cirrus CLI
//!
//! Command-line interface for long-running AWS operations: submits a job,
//! waits for it to settle, or streams a file through a multipart upload.

mod commands;
mod config;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, handle_command};
use config::Config;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "cirrus")]
#[command(about = "Wait on AWS jobs and sequence multipart uploads", long_about = None)]
struct Cli {
    /// AWS region (falls back to the default provider chain, then us-west-2)
    #[arg(long, global = true, env = "AWS_REGION")]
    region: Option<String>,

    /// Seconds between two status checks
    #[arg(long, global = true, value_name = "SECS")]
    poll_interval: Option<u64>,

    /// Give up after this many status checks
    #[arg(long, global = true, value_name = "N")]
    max_attempts: Option<u32>,

    /// Give up after this many seconds of polling
    #[arg(long, global = true, value_name = "SECS")]
    timeout: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cirrus=info,cirrus_runner=info,cirrus_client=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config = Config::load(cli.region, cli.poll_interval, cli.max_attempts, cli.timeout)?;

    handle_command(cli.command, &config).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::autoscaling::AutoScalingCommands;
    use crate::commands::lookout_vision::LookoutVisionCommands;
    use crate::commands::rekognition::RekognitionCommands;
    use crate::commands::s3::S3Commands;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_poll_flags() {
        let cli = Cli::try_parse_from([
            "cirrus",
            "--region",
            "eu-west-1",
            "--poll-interval",
            "30",
            "--max-attempts",
            "40",
            "lookout-vision",
            "describe-model",
            "widgets",
            "1",
        ])
        .unwrap();

        assert_eq!(cli.region.as_deref(), Some("eu-west-1"));
        assert_eq!(cli.poll_interval, Some(30));
        assert_eq!(cli.max_attempts, Some(40));
        assert_eq!(cli.timeout, None);
        assert!(matches!(
            cli.command,
            Commands::LookoutVision {
                command: LookoutVisionCommands::DescribeModel { .. }
            }
        ));
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "cirrus",
            "rekognition",
            "detect-labels",
            "s3://media/clip.mp4",
            "--timeout",
            "600",
        ])
        .unwrap();

        assert_eq!(cli.timeout, Some(600));
        match cli.command {
            Commands::Rekognition {
                command: RekognitionCommands::DetectLabels { video, min_confidence },
            } => {
                assert_eq!(video, "s3://media/clip.mp4");
                assert_eq!(min_confidence, None);
            }
            _ => panic!("expected detect-labels"),
        }
    }

    #[test]
    fn test_upload_arguments() {
        let cli = Cli::try_parse_from([
            "cirrus",
            "s3",
            "upload",
            "bucket--usw2-az1--x-s3",
            "./video.mp4",
            "--part-size-mb",
            "16",
            "--concurrency",
            "4",
        ])
        .unwrap();

        match cli.command {
            Commands::S3 {
                command:
                    S3Commands::Upload {
                        bucket,
                        file,
                        key,
                        part_size_mb,
                        concurrency,
                    },
            } => {
                assert_eq!(bucket, "bucket--usw2-az1--x-s3");
                assert_eq!(file, std::path::PathBuf::from("./video.mp4"));
                assert_eq!(key, None);
                assert_eq!(part_size_mb, Some(16));
                assert_eq!(concurrency, Some(4));
            }
            _ => panic!("expected upload"),
        }
    }

    #[test]
    fn test_training_and_update_commands() {
        let cli = Cli::try_parse_from([
            "cirrus",
            "rekognition",
            "create-version",
            "arn:aws:rekognition:us-west-2:123456789012:project/widgets/1",
            "widgets.v2",
            "--output",
            "s3://models/widgets/",
        ])
        .unwrap();

        match cli.command {
            Commands::Rekognition {
                command:
                    RekognitionCommands::CreateVersion {
                        version_name,
                        output,
                        ..
                    },
            } => {
                assert_eq!(version_name, "widgets.v2");
                assert_eq!(output, "s3://models/widgets/");
            }
            _ => panic!("expected create-version"),
        }

        let cli = Cli::try_parse_from([
            "cirrus",
            "lookout-vision",
            "update-dataset",
            "widgets",
            "--changes",
            "changes.manifest",
        ])
        .unwrap();

        match cli.command {
            Commands::LookoutVision {
                command:
                    LookoutVisionCommands::UpdateDataset {
                        project,
                        changes,
                        dataset_type,
                    },
            } => {
                assert_eq!(project, "widgets");
                assert_eq!(changes, std::path::PathBuf::from("changes.manifest"));
                assert_eq!(dataset_type, "train");
            }
            _ => panic!("expected update-dataset"),
        }
    }

    #[test]
    fn test_autoscaling_dimension_values() {
        let cli = Cli::try_parse_from([
            "cirrus",
            "autoscaling",
            "put-policy",
            "Movies",
            "--dimension",
            "write",
            "--policy-name",
            "movies-write",
            "--target",
            "70",
        ])
        .unwrap();

        match cli.command {
            Commands::Autoscaling {
                command:
                    AutoScalingCommands::PutPolicy {
                        table,
                        dimension,
                        policy_name,
                        target,
                    },
            } => {
                assert_eq!(table, "Movies");
                assert_eq!(
                    cirrus_client::CapacityDimension::from(dimension),
                    cirrus_client::CapacityDimension::Write
                );
                assert_eq!(policy_name, "movies-write");
                assert_eq!(target, 70.0);
            }
            _ => panic!("expected put-policy"),
        }

        let invalid = Cli::try_parse_from([
            "cirrus",
            "autoscaling",
            "register",
            "Movies",
            "--dimension",
            "storage",
        ]);
        assert!(invalid.is_err());
    }

    #[test]
    fn test_missing_arguments_are_rejected() {
        assert!(Cli::try_parse_from(["cirrus", "lookout-vision", "start-model", "widgets"]).is_err());
        assert!(Cli::try_parse_from(["cirrus", "s3", "abort-upload", "bucket", "key"]).is_err());
        assert!(Cli::try_parse_from(["cirrus", "--max-attempts", "many", "s3", "list-uploads", "b"]).is_err());
    }
}
