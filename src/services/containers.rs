//! Reverse lookup from a service name to the pods currently running it.
//!
//! Nothing on a pod points back at the deployment request, so the lookup leans
//! on naming: a Deployment `foo-bar` owns ReplicaSets `foo-bar-<hash>`, which own
//! pods `foo-bar-<hash>-<suffix>`. The ReplicaSet is found by stripping the last
//! `-` segment from each ReplicaSet name; pods are then matched by substring.
//!
//! Creation timestamps are read back from the typed `Time`, which always
//! serializes to whole seconds with a `Z` suffix. The parse-failure arm in
//! `to_instance` is unreachable for pods from the API today; if it ever fires
//! the pod is still listed, stamped with the current time.

use chrono::{DateTime, NaiveDateTime, Utc};
use k8s_openapi::api::apps::v1::ReplicaSet;
use k8s_openapi::api::core::v1::Pod;
use tracing::{debug, warn};

use crate::features::models::ContainerInstance;
use crate::services::cluster::ClusterClient;
use crate::services::resources::DEFAULT_NAMESPACE;
use crate::utilities::errors::AppError;

pub const CREATION_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Outcome of looking for the ReplicaSet generation behind a service.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum ReplicaSetResolution {
    Matched(String),
    /// More than one generation matched; the first listed is used.
    Ambiguous { selected: String, candidates: usize },
    /// Nothing matched. `fallback` is the last ReplicaSet listed, or the
    /// service name itself when there were none, and pods are still matched
    /// against it.
    Unmatched { fallback: String },
}

impl ReplicaSetResolution {
    pub fn pod_name_fragment(&self) -> &str {
        match self {
            Self::Matched(name) => name,
            Self::Ambiguous { selected, .. } => selected,
            Self::Unmatched { fallback } => fallback,
        }
    }
}

/// Name of the Deployment that owns a ReplicaSet, i.e. everything before the last `-`.
pub fn owning_service_name(replica_set_name: &str) -> Option<&str> {
    replica_set_name.rsplit_once('-').map(|(owner, _)| owner)
}

pub fn resolve_replica_set(service_name: &str, replica_sets: &[ReplicaSet]) -> ReplicaSetResolution {
    let names: Vec<&str> = replica_sets
        .iter()
        .filter_map(|rs| rs.metadata.name.as_deref())
        .collect();

    let mut matches = names
        .iter()
        .filter(|name| owning_service_name(name) == Some(service_name));

    match matches.next() {
        Some(first) => {
            let candidates = 1 + matches.count();
            if candidates == 1 {
                ReplicaSetResolution::Matched(first.to_string())
            } else {
                ReplicaSetResolution::Ambiguous {
                    selected: first.to_string(),
                    candidates,
                }
            }
        }
        None => ReplicaSetResolution::Unmatched {
            fallback: names.last().copied().unwrap_or(service_name).to_string(),
        },
    }
}

pub fn parse_creation_timestamp(value: &str) -> Result<DateTime<Utc>, AppError> {
    let naive = NaiveDateTime::parse_from_str(value, CREATION_TIMESTAMP_FORMAT)?;
    Ok(naive.and_utc())
}

// The typed timestamp serializes back to the wire string the API server sent.
fn creation_timestamp_text(pod: &Pod) -> Option<String> {
    let timestamp = pod.metadata.creation_timestamp.as_ref()?;
    serde_json::to_value(timestamp)
        .ok()?
        .as_str()
        .map(str::to_string)
}

fn to_instance(pod: &Pod, pod_name: &str) -> ContainerInstance {
    let created_at = match creation_timestamp_text(pod) {
        Some(text) => parse_creation_timestamp(&text).unwrap_or_else(|e| {
            warn!(
                "Unparsable creation timestamp for pod {}, '{}', {}",
                pod_name, text, e
            );
            Utc::now()
        }),
        None => {
            warn!("Pod {} has no creation timestamp", pod_name);
            Utc::now()
        }
    };

    let status = pod.status.as_ref();

    ContainerInstance {
        pod_name: pod_name.to_string(),
        uid: pod.metadata.uid.clone().unwrap_or_default(),
        host_address: status
            .and_then(|s| s.host_ip.clone())
            .unwrap_or_default(),
        pod_address: status.and_then(|s| s.pod_ip.clone()).unwrap_or_default(),
        created_at,
    }
}

/// Pods whose name contains `fragment` anywhere, in listing order.
pub fn select_pods(fragment: &str, pods: &[Pod]) -> Vec<ContainerInstance> {
    pods.iter()
        .filter_map(|pod| {
            let name = pod.metadata.name.as_deref()?;
            name.contains(fragment).then(|| to_instance(pod, name))
        })
        .collect()
}

pub struct ContainerResolver;

impl ContainerResolver {
    pub async fn get_all_containers(
        cluster: &dyn ClusterClient,
        service_name: &str,
    ) -> Result<Vec<ContainerInstance>, AppError> {
        let replica_sets = cluster.list_replica_sets(DEFAULT_NAMESPACE).await?;
        let resolution = resolve_replica_set(service_name, &replica_sets);

        match &resolution {
            ReplicaSetResolution::Matched(name) => {
                debug!("Service {} resolved to replica set {}", service_name, name)
            }
            ReplicaSetResolution::Ambiguous {
                selected,
                candidates,
            } => warn!(
                "Service {} matches {} replica sets, using {}",
                service_name, candidates, selected
            ),
            ReplicaSetResolution::Unmatched { fallback } => warn!(
                "No replica set found for service {}, matching pods against '{}'",
                service_name, fallback
            ),
        }

        let pods = cluster.list_pods(DEFAULT_NAMESPACE).await?;

        Ok(select_pods(resolution.pod_name_fragment(), &pods))
    }
}
