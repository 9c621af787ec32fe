//! Scheduler layer for the runner
//!
//! This layer waits for asynchronous jobs: it queries the job status
//! through a status source, classifies it, and sleeps between queries
//! until the job settles.

pub mod poller;
mod sleeper;

pub use poller::JobPoller;
pub use sleeper::{Sleeper, TokioSleeper};
