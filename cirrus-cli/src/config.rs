//! Configuration module
//!
//! Combines command-line flags with the runner configuration read from the
//! environment. Flags win over environment values, which win over defaults.

use anyhow::{Context, Result};
use cirrus_runner::{PollConfig, TransferConfig};
use std::time::Duration;
use tracing::debug;

/// CLI configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Region requested on the command line or through `AWS_REGION`
    pub region: Option<String>,

    /// How jobs are waited on
    pub poll: PollConfig,

    /// How multipart uploads are split and sent
    pub transfer: TransferConfig,
}

impl Config {
    /// Builds the configuration and validates the polling part
    ///
    /// Transfer settings are validated by the upload command, after its own
    /// flags are applied.
    pub fn load(
        region: Option<String>,
        poll_interval: Option<u64>,
        max_attempts: Option<u32>,
        timeout: Option<u64>,
    ) -> Result<Self> {
        let mut poll = PollConfig::from_env().context("Failed to read polling configuration")?;
        if let Some(secs) = poll_interval {
            poll = poll.with_interval(Duration::from_secs(secs));
        }
        if let Some(max) = max_attempts {
            poll = poll.with_max_attempts(max);
        }
        if let Some(secs) = timeout {
            poll = poll.with_timeout(Duration::from_secs(secs));
        }
        poll.validate()?;

        let transfer =
            TransferConfig::from_env().context("Failed to read transfer configuration")?;

        debug!(
            "Loaded configuration: region {:?}, poll {:?}, transfer {:?}",
            region, poll, transfer
        );

        Ok(Self {
            region,
            poll,
            transfer,
        })
    }
}
