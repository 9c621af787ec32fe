//! Auto Scaling command handlers
//!
//! Handles target tracking on the read or write capacity of DynamoDB tables.

use anyhow::Result;
use cirrus_client::{AutoScalingClient, CapacityDimension, load_sdk_config};
use clap::{Subcommand, ValueEnum};
use colored::*;

use crate::config::Config;

/// Table capacity dimension as given on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Capacity {
    Read,
    Write,
}

impl From<Capacity> for CapacityDimension {
    fn from(capacity: Capacity) -> Self {
        match capacity {
            Capacity::Read => CapacityDimension::Read,
            Capacity::Write => CapacityDimension::Write,
        }
    }
}

/// Auto Scaling subcommands
#[derive(Subcommand)]
pub enum AutoScalingCommands {
    /// Register a table's capacity as a scalable target
    Register {
        /// Table name
        table: String,

        #[arg(long, value_enum, default_value = "read")]
        dimension: Capacity,

        /// Minimum capacity units
        #[arg(long, default_value_t = 5)]
        min: i32,

        /// Maximum capacity units
        #[arg(long, default_value_t = 10)]
        max: i32,
    },
    /// Attach a target tracking policy to a registered target
    PutPolicy {
        /// Table name
        table: String,

        #[arg(long, value_enum, default_value = "read")]
        dimension: Capacity,

        #[arg(long)]
        policy_name: String,

        /// Target utilization in percent (20-90)
        #[arg(long, default_value_t = 50.0)]
        target: f64,
    },
    /// Show the scalable targets registered for a table
    Describe {
        /// Table name
        table: String,
    },
    /// Delete a scaling policy
    DeletePolicy {
        /// Table name
        table: String,

        #[arg(long, value_enum, default_value = "read")]
        dimension: Capacity,

        #[arg(long)]
        policy_name: String,
    },
    /// Deregister a scalable target
    Deregister {
        /// Table name
        table: String,

        #[arg(long, value_enum, default_value = "read")]
        dimension: Capacity,
    },
}

/// Handle Auto Scaling commands
///
/// # Arguments
/// * `command` - The Auto Scaling command to execute
/// * `config` - The CLI configuration
pub async fn handle_autoscaling_command(
    command: AutoScalingCommands,
    config: &Config,
) -> Result<()> {
    let sdk_config = load_sdk_config(config.region.clone()).await;
    let client = AutoScalingClient::new(&sdk_config);

    match command {
        AutoScalingCommands::Register {
            table,
            dimension,
            min,
            max,
        } => {
            let dimension = CapacityDimension::from(dimension);
            client
                .register_scalable_target(&table, dimension, min, max)
                .await?;
            println!(
                "{} Registered {} capacity of {} ({}..{})",
                "✓".green(),
                dimension,
                table.bold(),
                min,
                max
            );
            Ok(())
        }
        AutoScalingCommands::PutPolicy {
            table,
            dimension,
            policy_name,
            target,
        } => {
            let dimension = CapacityDimension::from(dimension);
            client
                .put_scaling_policy(&table, dimension, &policy_name, target)
                .await?;
            println!(
                "{} Policy {} tracks {}% {} utilization of {}",
                "✓".green(),
                policy_name.bold(),
                target,
                dimension,
                table
            );
            Ok(())
        }
        AutoScalingCommands::Describe { table } => {
            let targets = client.describe_scalable_targets(&table).await?;

            if targets.is_empty() {
                println!(
                    "{}",
                    format!("No scalable targets registered for {}.", table).yellow()
                );
            } else {
                println!(
                    "{}",
                    format!("Found {} scalable target(s):", targets.len()).bold()
                );
                for target in targets {
                    println!("{}", target);
                }
            }
            Ok(())
        }
        AutoScalingCommands::DeletePolicy {
            table,
            dimension,
            policy_name,
        } => {
            client
                .delete_scaling_policy(&table, dimension.into(), &policy_name)
                .await?;
            println!("{} Deleted policy {}", "✓".green(), policy_name.bold());
            Ok(())
        }
        AutoScalingCommands::Deregister { table, dimension } => {
            let dimension = CapacityDimension::from(dimension);
            client.deregister_scalable_target(&table, dimension).await?;
            println!(
                "{} Deregistered {} capacity of {}",
                "✓".green(),
                dimension,
                table.bold()
            );
            Ok(())
        }
    }
}
