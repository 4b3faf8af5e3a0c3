use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Workload kinds a deployment request may ask for.
#[derive(Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum DeployMode {
    #[default]
    Deployment,
}

/// One step of the create-deployment-and-service sequence, in submission order.
#[derive(Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Debug)]
#[serde(rename_all = "camelCase")]
pub enum ProvisionStep {
    Deployment,
    Service,
    Autoscaler,
}

impl fmt::Display for ProvisionStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let step = match self {
            Self::Deployment => "deployment",
            Self::Service => "service",
            Self::Autoscaler => "autoscaler",
        };
        f.write_str(step)
    }
}

/// Point-in-time view of a pod backing a service.
#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ContainerInstance {
    pub pod_name: String,
    pub uid: String,
    pub host_address: String,
    pub pod_address: String,
    pub created_at: DateTime<Utc>,
}
