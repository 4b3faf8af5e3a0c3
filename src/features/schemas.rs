use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::features::models::{DeployMode, ProvisionStep};

static SERVICE_NAME_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9]([-a-z0-9]*[a-z0-9])?$").unwrap());

#[derive(Deserialize, Serialize, Validate, Clone, PartialEq, Debug)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_replica_bounds"))]
pub struct DeploymentRequest {
    #[validate(length(min = 1, max = 63), regex(path = *SERVICE_NAME_REGEX))]
    pub service_name: String,
    #[serde(default)]
    pub deploy_mode: DeployMode,
    #[validate(length(min = 1))]
    pub image_name: String,
    #[validate(length(min = 1))]
    pub image_version: String,
    #[validate(range(min = 1, max = 65535))]
    pub port: i32,
    #[validate(range(min = 30000, max = 32767))]
    pub node_port: i32,
    #[validate(range(exclusive_min = 0.0))]
    pub cpu: f64,
    #[validate(range(exclusive_min = 0.0))]
    pub memory: f64,
    #[validate(range(min = 1))]
    pub min_replicas: i32,
    #[validate(range(min = 1))]
    pub max_replicas: i32,
    #[serde(rename = "targetCPUUtilizationPercentage")]
    #[validate(range(min = 1, max = 100))]
    pub target_cpu_utilization_percentage: i32,
}

fn validate_replica_bounds(req: &DeploymentRequest) -> Result<(), ValidationError> {
    if req.max_replicas < req.min_replicas {
        return Err(ValidationError::new("max_replicas_below_min_replicas"));
    }
    Ok(())
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ProvisionReport {
    pub service_name: String,
    pub completed_steps: Vec<ProvisionStep>,
}

#[derive(Serialize, Debug)]
pub struct ListResponse<T> {
    pub total: usize,
    pub data: Vec<T>,
}

#[derive(Serialize, Debug)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
