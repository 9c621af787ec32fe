//! Job poller
//!
//! Waits for an asynchronous job to settle. Each cycle fetches the status
//! once, classifies it and either returns or sleeps for the poll interval.

use chrono::Utc;
use cirrus_client::JobStatusSource;
use cirrus_core::domain::job::{JobHandle, PollOutcome, PollReport, StatusClass};
use std::fmt::Debug;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::config::PollConfig;
use crate::error::{Result, RunnerError};
use crate::scheduler::sleeper::{Sleeper, TokioSleeper};

/// Generic poller for one kind of asynchronous job
///
/// `classify` decides what each status means for the caller's goal, so the
/// same source can be waited on in different ways (e.g. a model that is
/// training and one that is being hosted).
pub struct JobPoller<Src, F, Sl = TokioSleeper> {
    source: Src,
    classify: F,
    config: PollConfig,
    sleeper: Sl,
}

impl<Src, F> JobPoller<Src, F, TokioSleeper>
where
    Src: JobStatusSource,
    F: Fn(&Src::Status) -> StatusClass,
{
    /// Creates a new poller sleeping on the tokio timer
    pub fn new(source: Src, classify: F, config: PollConfig) -> Self {
        Self {
            source,
            classify,
            config,
            sleeper: TokioSleeper,
        }
    }
}

impl<Src, F, Sl> JobPoller<Src, F, Sl>
where
    Src: JobStatusSource,
    Src::Status: Debug,
    F: Fn(&Src::Status) -> StatusClass,
    Sl: Sleeper,
{
    /// Replaces the sleeper
    pub fn with_sleeper<S2: Sleeper>(self, sleeper: S2) -> JobPoller<Src, F, S2> {
        JobPoller {
            source: self.source,
            classify: self.classify,
            config: self.config,
            sleeper,
        }
    }

    pub fn config(&self) -> &PollConfig {
        &self.config
    }

    /// Polls the job until it reaches a terminal status
    ///
    /// A failed or unrecognized terminal status is returned as the report's
    /// outcome, not as an error. Errors are reserved for an invalid
    /// configuration, fetch failures and the optional limits.
    pub async fn poll(&self, handle: &JobHandle) -> Result<PollReport<Src::Status, Src::Payload>> {
        self.config.validate()?;

        let started_at = Utc::now();
        let clock = Instant::now();
        let mut attempts: u32 = 0;
        let mut waits: u32 = 0;

        info!(
            "Waiting for job {} (interval: {:?})",
            handle, self.config.interval
        );

        loop {
            attempts += 1;
            let observation = self.source.fetch_status(handle).await?;
            let class = (self.classify)(&observation.status);

            debug!(
                "Job {} check {}: {:?} ({})",
                handle, attempts, observation.status, class
            );

            if let Some(outcome) = PollOutcome::from_terminal(class, observation) {
                match &outcome {
                    PollOutcome::Succeeded { status, .. } => {
                        info!("Job {} finished with {:?} after {} check(s)", handle, status, attempts)
                    }
                    PollOutcome::Failed { status, .. } => {
                        warn!("Job {} failed with {:?}", handle, status)
                    }
                    PollOutcome::Unknown { status, .. } => {
                        warn!("Job {} stopped on unexpected status {:?}", handle, status)
                    }
                }

                return Ok(PollReport {
                    handle: handle.clone(),
                    outcome,
                    attempts,
                    waits,
                    started_at,
                    finished_at: Utc::now(),
                });
            }

            if self.config.max_attempts.is_some_and(|max| attempts >= max) {
                return Err(RunnerError::AttemptsExhausted {
                    handle: handle.clone(),
                    attempts,
                });
            }

            if let Some(timeout) = self.config.timeout {
                if clock.elapsed() + self.config.interval > timeout {
                    return Err(RunnerError::TimedOut {
                        handle: handle.clone(),
                        timeout,
                    });
                }
            }

            self.sleeper.sleep(self.config.interval).await;
            waits += 1;
        }
    }
}
