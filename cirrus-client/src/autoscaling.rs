//! Application Auto Scaling for DynamoDB table capacity

use aws_config::SdkConfig;
use aws_sdk_applicationautoscaling::Client;
use aws_sdk_applicationautoscaling::types::{
    MetricType, PolicyType, PredefinedMetricSpecification, ScalableDimension, ServiceNamespace,
    TargetTrackingScalingPolicyConfiguration,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{ClientError, Result, ServiceResultExt};

const DYNAMODB_NAMESPACE: &str = "dynamodb";

/// Provisioned capacity dimension of a DynamoDB table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CapacityDimension {
    Read,
    Write,
}

impl CapacityDimension {
    /// Scalable dimension identifier used by Application Auto Scaling
    pub fn scalable_dimension(&self) -> &'static str {
        match self {
            CapacityDimension::Read => "dynamodb:table:ReadCapacityUnits",
            CapacityDimension::Write => "dynamodb:table:WriteCapacityUnits",
        }
    }

    /// Predefined utilization metric tracked by target tracking policies
    pub fn utilization_metric(&self) -> &'static str {
        match self {
            CapacityDimension::Read => "DynamoDBReadCapacityUtilization",
            CapacityDimension::Write => "DynamoDBWriteCapacityUtilization",
        }
    }
}

impl std::fmt::Display for CapacityDimension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CapacityDimension::Read => write!(f, "read"),
            CapacityDimension::Write => write!(f, "write"),
        }
    }
}

/// Resource id of a DynamoDB table, e.g. `table/Movies`
pub fn table_resource_id(table: &str) -> String {
    format!("table/{}", table)
}

/// Validates a target tracking utilization percentage
pub fn validate_target_utilization(target: f64) -> Result<()> {
    if !(20.0..=90.0).contains(&target) {
        return Err(ClientError::InvalidRequest(format!(
            "target utilization must be between 20 and 90 percent, got {}",
            target
        )));
    }
    Ok(())
}

/// Application Auto Scaling client, restricted to DynamoDB tables
#[derive(Debug, Clone)]
pub struct AutoScalingClient {
    client: Client,
}

impl AutoScalingClient {
    pub fn new(config: &SdkConfig) -> Self {
        Self {
            client: Client::new(config),
        }
    }

    pub fn from_client(client: Client) -> Self {
        Self { client }
    }

    /// Registers a table's capacity as a scalable target
    pub async fn register_scalable_target(
        &self,
        table: &str,
        dimension: CapacityDimension,
        min_capacity: i32,
        max_capacity: i32,
    ) -> Result<()> {
        if min_capacity < 1 || min_capacity > max_capacity {
            return Err(ClientError::InvalidRequest(format!(
                "capacity range {}..{} is invalid",
                min_capacity, max_capacity
            )));
        }

        self.client
            .register_scalable_target()
            .service_namespace(ServiceNamespace::from(DYNAMODB_NAMESPACE))
            .resource_id(table_resource_id(table))
            .scalable_dimension(ScalableDimension::from(dimension.scalable_dimension()))
            .min_capacity(min_capacity)
            .max_capacity(max_capacity)
            .send()
            .await
            .or_service("RegisterScalableTarget")?;

        info!(
            "Registered {} capacity of table {} ({}..{})",
            dimension, table, min_capacity, max_capacity
        );
        Ok(())
    }

    /// Attaches a target tracking policy on the dimension's utilization metric
    pub async fn put_scaling_policy(
        &self,
        table: &str,
        dimension: CapacityDimension,
        policy_name: &str,
        target_utilization: f64,
    ) -> Result<()> {
        validate_target_utilization(target_utilization)?;

        let metric = PredefinedMetricSpecification::builder()
            .predefined_metric_type(MetricType::from(dimension.utilization_metric()))
            .build()?;
        let configuration = TargetTrackingScalingPolicyConfiguration::builder()
            .predefined_metric_specification(metric)
            .target_value(target_utilization)
            .build()?;

        self.client
            .put_scaling_policy()
            .policy_name(policy_name)
            .service_namespace(ServiceNamespace::from(DYNAMODB_NAMESPACE))
            .resource_id(table_resource_id(table))
            .scalable_dimension(ScalableDimension::from(dimension.scalable_dimension()))
            .policy_type(PolicyType::from("TargetTrackingScaling"))
            .target_tracking_scaling_policy_configuration(configuration)
            .send()
            .await
            .or_service("PutScalingPolicy")?;

        info!(
            "Put policy {} on {} capacity of table {} (target {}%)",
            policy_name, dimension, table, target_utilization
        );
        Ok(())
    }

    /// Describes the scalable targets registered for a table
    ///
    /// Each target is rendered with its debug representation.
    pub async fn describe_scalable_targets(&self, table: &str) -> Result<Vec<String>> {
        let resp = self
            .client
            .describe_scalable_targets()
            .service_namespace(ServiceNamespace::from(DYNAMODB_NAMESPACE))
            .resource_ids(table_resource_id(table))
            .send()
            .await
            .or_service("DescribeScalableTargets")?;

        Ok(resp
            .scalable_targets()
            .iter()
            .map(|target| format!("{:#?}", target))
            .collect())
    }

    pub async fn delete_scaling_policy(
        &self,
        table: &str,
        dimension: CapacityDimension,
        policy_name: &str,
    ) -> Result<()> {
        self.client
            .delete_scaling_policy()
            .policy_name(policy_name)
            .service_namespace(ServiceNamespace::from(DYNAMODB_NAMESPACE))
            .resource_id(table_resource_id(table))
            .scalable_dimension(ScalableDimension::from(dimension.scalable_dimension()))
            .send()
            .await
            .or_service("DeleteScalingPolicy")?;

        info!("Deleted policy {} of table {}", policy_name, table);
        Ok(())
    }

    pub async fn deregister_scalable_target(
        &self,
        table: &str,
        dimension: CapacityDimension,
    ) -> Result<()> {
        self.client
            .deregister_scalable_target()
            .service_namespace(ServiceNamespace::from(DYNAMODB_NAMESPACE))
            .resource_id(table_resource_id(table))
            .scalable_dimension(ScalableDimension::from(dimension.scalable_dimension()))
            .send()
            .await
            .or_service("DeregisterScalableTarget")?;

        info!("Deregistered {} capacity of table {}", dimension, table);
        Ok(())
    }
}
