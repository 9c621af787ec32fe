//! Cirrus Runner
//!
//! Drives long-running cloud operations to completion.
//!
//! Architecture:
//! - Configuration: polling and transfer settings from defaults or environment
//! - Scheduler: the generic job poller (fetch, classify, wait, repeat)
//! - Transfer: multipart upload sessions and the part uploader
//!
//! Remote calls go through the traits of `cirrus-client`, so everything
//! here runs unchanged against the AWS implementations or in-memory fakes.

pub mod config;
pub mod error;
pub mod scheduler;
pub mod transfer;

pub use config::{PollConfig, TransferConfig};
pub use error::{Result, RunnerError};
pub use scheduler::{JobPoller, Sleeper, TokioSleeper};
pub use transfer::{MultipartUploader, UploadSession, UploadSummary};
