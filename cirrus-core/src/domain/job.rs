//! Job domain types
//!
//! An asynchronous job is submitted once, identified by an opaque handle,
//! and then observed until the service reports a terminal status.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Opaque identifier of a submitted asynchronous job
///
/// Depending on the service this is a job id, a model version, a dataset
/// type or a project version ARN. Only the status source knows how to read it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobHandle(String);

impl JobHandle {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for JobHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for JobHandle {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for JobHandle {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Classification of a service status for one waiting goal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatusClass {
    /// The job has not finished yet; query again after the poll interval
    Pending,
    /// Terminal: the job reached the state the caller waits for
    Succeeded,
    /// Terminal: the service reported a failure
    Failed,
    /// Terminal: the status is outside the set expected for this goal
    Unknown,
}

impl StatusClass {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, StatusClass::Pending)
    }
}

impl std::fmt::Display for StatusClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StatusClass::Pending => write!(f, "Pending"),
            StatusClass::Succeeded => write!(f, "Succeeded"),
            StatusClass::Failed => write!(f, "Failed"),
            StatusClass::Unknown => write!(f, "Unknown"),
        }
    }
}

/// A single status fetch: the status code and whatever the service returned with it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation<S, P> {
    pub status: S,
    pub payload: P,
}

impl<S, P> Observation<S, P> {
    pub fn new(status: S, payload: P) -> Self {
        Self { status, payload }
    }
}

/// Terminal result of polling a job
///
/// A failed job is not an error of the poller: the payload usually carries
/// the service's failure reason, so the caller decides what to do with it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PollOutcome<S, P> {
    Succeeded { status: S, payload: P },
    Failed { status: S, payload: P },
    Unknown { status: S, payload: P },
}

impl<S, P> PollOutcome<S, P> {
    /// Builds the outcome for a terminal observation
    ///
    /// Returns `None` when the class is still pending.
    pub fn from_terminal(class: StatusClass, observation: Observation<S, P>) -> Option<Self> {
        let Observation { status, payload } = observation;
        match class {
            StatusClass::Pending => None,
            StatusClass::Succeeded => Some(PollOutcome::Succeeded { status, payload }),
            StatusClass::Failed => Some(PollOutcome::Failed { status, payload }),
            StatusClass::Unknown => Some(PollOutcome::Unknown { status, payload }),
        }
    }

    pub fn class(&self) -> StatusClass {
        match self {
            PollOutcome::Succeeded { .. } => StatusClass::Succeeded,
            PollOutcome::Failed { .. } => StatusClass::Failed,
            PollOutcome::Unknown { .. } => StatusClass::Unknown,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, PollOutcome::Succeeded { .. })
    }

    pub fn status(&self) -> &S {
        match self {
            PollOutcome::Succeeded { status, .. }
            | PollOutcome::Failed { status, .. }
            | PollOutcome::Unknown { status, .. } => status,
        }
    }

    pub fn payload(&self) -> &P {
        match self {
            PollOutcome::Succeeded { payload, .. }
            | PollOutcome::Failed { payload, .. }
            | PollOutcome::Unknown { payload, .. } => payload,
        }
    }

    pub fn into_payload(self) -> P {
        match self {
            PollOutcome::Succeeded { payload, .. }
            | PollOutcome::Failed { payload, .. }
            | PollOutcome::Unknown { payload, .. } => payload,
        }
    }
}

/// Poll outcome together with bookkeeping about how it was reached
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollReport<S, P> {
    pub handle: JobHandle,
    pub outcome: PollOutcome<S, P>,
    /// Number of status fetches performed
    pub attempts: u32,
    /// Number of waits performed between fetches
    pub waits: u32,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl<S, P> PollReport<S, P> {
    pub fn elapsed(&self) -> chrono::Duration {
        self.finished_at.signed_duration_since(self.started_at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handle_display() {
        let handle = JobHandle::new("job-123");
        assert_eq!(handle.to_string(), "job-123");
        assert_eq!(handle.as_str(), "job-123");
        assert_eq!(JobHandle::from("job-123"), handle);
    }

    #[test]
    fn test_outcome_from_terminal() {
        let obs = Observation::new("SUCCEEDED", 7);
        let outcome = PollOutcome::from_terminal(StatusClass::Succeeded, obs).unwrap();
        assert!(outcome.is_success());
        assert_eq!(*outcome.status(), "SUCCEEDED");
        assert_eq!(outcome.into_payload(), 7);

        let pending = PollOutcome::from_terminal(StatusClass::Pending, Observation::new("X", 0));
        assert!(pending.is_none());
    }

    #[test]
    fn test_outcome_class() {
        let failed = PollOutcome::Failed {
            status: "FAILED",
            payload: "reason",
        };
        assert_eq!(failed.class(), StatusClass::Failed);
        assert!(!failed.is_success());
        assert_eq!(*failed.payload(), "reason");
    }

    #[test]
    fn test_terminal_classes() {
        assert!(!StatusClass::Pending.is_terminal());
        assert!(StatusClass::Succeeded.is_terminal());
        assert!(StatusClass::Failed.is_terminal());
        assert!(StatusClass::Unknown.is_terminal());
    }
}
