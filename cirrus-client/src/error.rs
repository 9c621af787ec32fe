//! Error types for the Cirrus client

use aws_smithy_types::error::display::DisplayErrorContext;
use aws_smithy_types::error::metadata::ProvideErrorMetadata;
use aws_smithy_types::error::operation::BuildError;
use thiserror::Error;

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors that can occur when calling a cloud service
#[derive(Debug, Error)]
pub enum ClientError {
    /// The service (or the SDK on its behalf) rejected the call
    #[error("{operation} failed: {message}")]
    Service {
        /// Service operation name, e.g. `DescribeModel`
        operation: &'static str,
        /// Service error code, when the service sent one
        code: Option<String>,
        /// Human readable message
        message: String,
    },

    /// A response did not contain a field the operation relies on
    #[error("{operation} response did not include {field}")]
    MissingField {
        operation: &'static str,
        field: &'static str,
    },

    /// Invalid request parameters, caught before sending
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl ClientError {
    /// Create a service error from an SDK error
    pub fn service<E>(operation: &'static str, err: E) -> Self
    where
        E: ProvideErrorMetadata + std::error::Error,
    {
        let code = err.code().map(str::to_string);
        let message = match err.message() {
            Some(message) => message.to_string(),
            None => DisplayErrorContext(&err).to_string(),
        };

        Self::Service {
            operation,
            code,
            message,
        }
    }

    /// Create an error for a missing response field
    pub fn missing(operation: &'static str, field: &'static str) -> Self {
        Self::MissingField { operation, field }
    }

    /// Service error code, if any
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::Service { code, .. } => code.as_deref(),
            _ => None,
        }
    }

    /// Check if this error means the addressed resource does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(
            self.code(),
            Some("ResourceNotFoundException" | "NoSuchBucket" | "NoSuchKey" | "NoSuchUpload")
        )
    }
}

impl From<BuildError> for ClientError {
    fn from(err: BuildError) -> Self {
        Self::InvalidRequest(err.to_string())
    }
}

/// Maps SDK call results into [`ClientError::Service`]
pub(crate) trait ServiceResultExt<T> {
    fn or_service(self, operation: &'static str) -> Result<T>;
}

impl<T, E> ServiceResultExt<T> for std::result::Result<T, E>
where
    E: ProvideErrorMetadata + std::error::Error,
{
    fn or_service(self, operation: &'static str) -> Result<T> {
        self.map_err(|err| ClientError::service(operation, err))
    }
}
