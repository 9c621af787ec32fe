//! Lookout for Vision model and dataset statuses

use crate::domain::job::StatusClass;

service_status! {
    /// Status of a Lookout for Vision model version
    pub enum ModelStatus {
        Training => "TRAINING",
        Trained => "TRAINED",
        TrainingFailed => "TRAINING_FAILED",
        StartingHosting => "STARTING_HOSTING",
        Hosted => "HOSTED",
        HostingFailed => "HOSTING_FAILED",
        StoppingHosting => "STOPPING_HOSTING",
        SystemUpdating => "SYSTEM_UPDATING",
        Deleting => "DELETING",
    }
}

impl ModelStatus {
    /// Classifier for waiting on `CreateModel` to finish training
    pub fn training(status: &Self) -> StatusClass {
        match status {
            ModelStatus::Training => StatusClass::Pending,
            ModelStatus::Trained => StatusClass::Succeeded,
            ModelStatus::TrainingFailed => StatusClass::Failed,
            _ => StatusClass::Unknown,
        }
    }

    /// Classifier for waiting on `StartModel` to host the model
    pub fn hosting(status: &Self) -> StatusClass {
        match status {
            ModelStatus::StartingHosting | ModelStatus::SystemUpdating => StatusClass::Pending,
            ModelStatus::Hosted => StatusClass::Succeeded,
            ModelStatus::HostingFailed => StatusClass::Failed,
            _ => StatusClass::Unknown,
        }
    }

    /// Classifier for waiting on `StopModel`; a stopped model is back to `TRAINED`
    pub fn stopping(status: &Self) -> StatusClass {
        match status {
            ModelStatus::StoppingHosting => StatusClass::Pending,
            ModelStatus::Trained => StatusClass::Succeeded,
            ModelStatus::HostingFailed => StatusClass::Failed,
            _ => StatusClass::Unknown,
        }
    }
}

service_status! {
    /// Status of a Lookout for Vision dataset
    pub enum DatasetStatus {
        CreateInProgress => "CREATE_IN_PROGRESS",
        CreateComplete => "CREATE_COMPLETE",
        CreateFailed => "CREATE_FAILED",
        UpdateInProgress => "UPDATE_IN_PROGRESS",
        UpdateComplete => "UPDATE_COMPLETE",
        UpdateFailedRollbackInProgress => "UPDATE_FAILED_ROLLBACK_IN_PROGRESS",
        UpdateFailedRollbackComplete => "UPDATE_FAILED_ROLLBACK_COMPLETE",
        DeleteInProgress => "DELETE_IN_PROGRESS",
        DeleteComplete => "DELETE_COMPLETE",
        DeleteFailed => "DELETE_FAILED",
    }
}

impl DatasetStatus {
    /// Classifier for waiting on `CreateDataset`
    pub fn creation(status: &Self) -> StatusClass {
        match status {
            DatasetStatus::CreateInProgress => StatusClass::Pending,
            DatasetStatus::CreateComplete => StatusClass::Succeeded,
            DatasetStatus::CreateFailed => StatusClass::Failed,
            _ => StatusClass::Unknown,
        }
    }

    /// Classifier for waiting on `UpdateDatasetEntries`
    ///
    /// A failed update rolls back before it settles, so the rollback keeps
    /// the job pending and only its completion is reported as the failure.
    pub fn update(status: &Self) -> StatusClass {
        match status {
            DatasetStatus::UpdateInProgress | DatasetStatus::UpdateFailedRollbackInProgress => {
                StatusClass::Pending
            }
            DatasetStatus::UpdateComplete => StatusClass::Succeeded,
            DatasetStatus::UpdateFailedRollbackComplete => StatusClass::Failed,
            _ => StatusClass::Unknown,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_status_parsing() {
        assert_eq!(ModelStatus::from("TRAINING"), ModelStatus::Training);
        assert_eq!(ModelStatus::from("HOSTED"), ModelStatus::Hosted);
        assert_eq!(
            ModelStatus::from("MELTING"),
            ModelStatus::Unrecognized("MELTING".to_string())
        );
        assert_eq!(ModelStatus::TrainingFailed.as_str(), "TRAINING_FAILED");
        assert_eq!(ModelStatus::from("MELTING").to_string(), "MELTING");
    }

    #[test]
    fn test_model_training_classifier() {
        assert_eq!(ModelStatus::training(&ModelStatus::Training), StatusClass::Pending);
        assert_eq!(ModelStatus::training(&ModelStatus::Trained), StatusClass::Succeeded);
        assert_eq!(
            ModelStatus::training(&ModelStatus::TrainingFailed),
            StatusClass::Failed
        );
        assert_eq!(ModelStatus::training(&ModelStatus::Hosted), StatusClass::Unknown);
    }

    #[test]
    fn test_model_hosting_and_stopping_classifiers() {
        assert_eq!(
            ModelStatus::hosting(&ModelStatus::StartingHosting),
            StatusClass::Pending
        );
        assert_eq!(ModelStatus::hosting(&ModelStatus::Hosted), StatusClass::Succeeded);
        assert_eq!(
            ModelStatus::hosting(&ModelStatus::HostingFailed),
            StatusClass::Failed
        );
        assert_eq!(
            ModelStatus::stopping(&ModelStatus::StoppingHosting),
            StatusClass::Pending
        );
        assert_eq!(ModelStatus::stopping(&ModelStatus::Trained), StatusClass::Succeeded);
        assert_eq!(ModelStatus::stopping(&ModelStatus::Training), StatusClass::Unknown);
    }

    #[test]
    fn test_dataset_classifiers() {
        assert_eq!(
            DatasetStatus::creation(&DatasetStatus::CreateInProgress),
            StatusClass::Pending
        );
        assert_eq!(
            DatasetStatus::creation(&DatasetStatus::CreateComplete),
            StatusClass::Succeeded
        );
        assert_eq!(
            DatasetStatus::creation(&DatasetStatus::CreateFailed),
            StatusClass::Failed
        );
        assert_eq!(
            DatasetStatus::update(&DatasetStatus::UpdateFailedRollbackInProgress),
            StatusClass::Pending
        );
        assert_eq!(
            DatasetStatus::update(&DatasetStatus::UpdateFailedRollbackComplete),
            StatusClass::Failed
        );
        assert_eq!(
            DatasetStatus::update(&DatasetStatus::from("SOMETHING_NEW")),
            StatusClass::Unknown
        );
    }

    #[test]
    fn test_status_serde_uses_wire_strings() {
        let json = serde_json::to_string(&DatasetStatus::CreateComplete).unwrap();
        assert_eq!(json, "\"CREATE_COMPLETE\"");

        let parsed: DatasetStatus = serde_json::from_str("\"CREATE_FAILED\"").unwrap();
        assert_eq!(parsed, DatasetStatus::CreateFailed);
    }
}
