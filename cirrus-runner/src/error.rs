//! Error types for the runner

use cirrus_client::ClientError;
use cirrus_core::MultipartError;
use cirrus_core::domain::job::JobHandle;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Result type alias for runner operations
pub type Result<T> = std::result::Result<T, RunnerError>;

/// Errors that stop a poll or a transfer
#[derive(Debug, Error)]
pub enum RunnerError {
    /// A cloud service call failed
    #[error(transparent)]
    Client(#[from] ClientError),

    /// The multipart sequence is not valid
    #[error("Multipart upload rejected: {0}")]
    Multipart(#[from] MultipartError),

    /// A local file could not be read
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The attempt limit was reached while the job was still pending
    #[error("Job {handle} still pending after {attempts} status check(s)")]
    AttemptsExhausted { handle: JobHandle, attempts: u32 },

    /// The time limit was reached while the job was still pending
    #[error("Job {handle} still pending after {timeout:?}")]
    TimedOut { handle: JobHandle, timeout: Duration },

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// A part upload task panicked or was cancelled
    #[error("Part upload task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl RunnerError {
    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| Self::Io { path, source }
    }
}
