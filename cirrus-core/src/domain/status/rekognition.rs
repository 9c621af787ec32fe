//! Rekognition video analysis and Custom Labels statuses

use crate::domain::job::StatusClass;

service_status! {
    /// Status of a stored-video analysis job (labels, faces, segments, ...)
    pub enum VideoJobStatus {
        InProgress => "IN_PROGRESS",
        Succeeded => "SUCCEEDED",
        Failed => "FAILED",
    }
}

impl VideoJobStatus {
    /// Classifier for waiting on a video analysis job
    pub fn completion(status: &Self) -> StatusClass {
        match status {
            VideoJobStatus::InProgress => StatusClass::Pending,
            VideoJobStatus::Succeeded => StatusClass::Succeeded,
            VideoJobStatus::Failed => StatusClass::Failed,
            VideoJobStatus::Unrecognized(_) => StatusClass::Unknown,
        }
    }
}

service_status! {
    /// Status of a Rekognition Custom Labels project version (model)
    pub enum ProjectVersionStatus {
        TrainingInProgress => "TRAINING_IN_PROGRESS",
        TrainingCompleted => "TRAINING_COMPLETED",
        TrainingFailed => "TRAINING_FAILED",
        Starting => "STARTING",
        Running => "RUNNING",
        Failed => "FAILED",
        Stopping => "STOPPING",
        Stopped => "STOPPED",
        Deleting => "DELETING",
        CopyingInProgress => "COPYING_IN_PROGRESS",
        CopyingCompleted => "COPYING_COMPLETED",
        CopyingFailed => "COPYING_FAILED",
        Deprecated => "DEPRECATED",
        Expired => "EXPIRED",
    }
}

impl ProjectVersionStatus {
    /// Classifier for waiting on `CreateProjectVersion` to finish training
    pub fn training(status: &Self) -> StatusClass {
        match status {
            ProjectVersionStatus::TrainingInProgress => StatusClass::Pending,
            ProjectVersionStatus::TrainingCompleted => StatusClass::Succeeded,
            ProjectVersionStatus::TrainingFailed => StatusClass::Failed,
            _ => StatusClass::Unknown,
        }
    }

    /// Classifier for waiting on `StartProjectVersion`
    pub fn running(status: &Self) -> StatusClass {
        match status {
            ProjectVersionStatus::Starting => StatusClass::Pending,
            ProjectVersionStatus::Running => StatusClass::Succeeded,
            ProjectVersionStatus::Failed => StatusClass::Failed,
            _ => StatusClass::Unknown,
        }
    }

    /// Classifier for waiting on `StopProjectVersion`
    pub fn stopping(status: &Self) -> StatusClass {
        match status {
            ProjectVersionStatus::Stopping => StatusClass::Pending,
            ProjectVersionStatus::Stopped => StatusClass::Succeeded,
            ProjectVersionStatus::Failed => StatusClass::Failed,
            _ => StatusClass::Unknown,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_video_job_completion() {
        assert_eq!(
            VideoJobStatus::completion(&VideoJobStatus::from("IN_PROGRESS")),
            StatusClass::Pending
        );
        assert_eq!(
            VideoJobStatus::completion(&VideoJobStatus::from("SUCCEEDED")),
            StatusClass::Succeeded
        );
        assert_eq!(
            VideoJobStatus::completion(&VideoJobStatus::from("FAILED")),
            StatusClass::Failed
        );
        assert_eq!(
            VideoJobStatus::completion(&VideoJobStatus::from("PAUSED")),
            StatusClass::Unknown
        );
    }

    #[test]
    fn test_project_version_classifiers() {
        assert_eq!(
            ProjectVersionStatus::training(&ProjectVersionStatus::TrainingInProgress),
            StatusClass::Pending
        );
        assert_eq!(
            ProjectVersionStatus::running(&ProjectVersionStatus::Running),
            StatusClass::Succeeded
        );
        assert_eq!(
            ProjectVersionStatus::running(&ProjectVersionStatus::Stopped),
            StatusClass::Unknown
        );
        assert_eq!(
            ProjectVersionStatus::stopping(&ProjectVersionStatus::Stopping),
            StatusClass::Pending
        );
        assert_eq!(
            ProjectVersionStatus::stopping(&ProjectVersionStatus::Stopped),
            StatusClass::Succeeded
        );
    }

    #[test]
    fn test_round_trip_through_string() {
        let status = ProjectVersionStatus::from("COPYING_IN_PROGRESS");
        assert_eq!(status, ProjectVersionStatus::CopyingInProgress);
        assert_eq!(String::from(status), "COPYING_IN_PROGRESS");
    }
}
