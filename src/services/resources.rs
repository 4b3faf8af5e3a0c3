//! Translation of a [`DeploymentRequest`] into the three cluster objects that
//! back one service: a Deployment, a NodePort Service and an autoscaler.
//!
//! All three carry the same name and the same single-entry label
//! `{name: <serviceName>}`. That label is also the Deployment selector and the
//! Service selector, which is what lets the objects address each other without
//! any generated identifier.

use std::collections::BTreeMap;

use k8s_openapi::api::apps::v1::{Deployment, DeploymentSpec};
use k8s_openapi::api::autoscaling::v1::{
    CrossVersionObjectReference, HorizontalPodAutoscaler, HorizontalPodAutoscalerSpec,
};
use k8s_openapi::api::core::v1::{
    Container, ContainerPort, PodSpec, PodTemplateSpec, ResourceRequirements, Service,
    ServicePort, ServiceSpec,
};
use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::LabelSelector;
use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;
use kube::api::ObjectMeta;

use crate::features::models::DeployMode;
use crate::features::schemas::DeploymentRequest;

pub const DEFAULT_NAMESPACE: &str = "default";
pub const LABEL_KEY: &str = "name";
pub const DEFAULT_REPLICAS: i32 = 1;
pub const MEMORY_UNIT: &str = "Gi";
pub const IMAGE_PULL_POLICY: &str = "Always";
pub const SERVICE_TYPE: &str = "NodePort";

/// Cluster object kinds this service emits or reads, each pinned to one API version.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ObjectKind {
    Deployment,
    Service,
    HorizontalPodAutoscaler,
    ReplicaSet,
    Pod,
}

impl ObjectKind {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Deployment => "Deployment",
            Self::Service => "Service",
            Self::HorizontalPodAutoscaler => "HorizontalPodAutoscaler",
            Self::ReplicaSet => "ReplicaSet",
            Self::Pod => "Pod",
        }
    }

    pub fn api_version(&self) -> &'static str {
        match self {
            Self::Deployment | Self::ReplicaSet => "apps/v1",
            Self::Service | Self::Pod => "v1",
            Self::HorizontalPodAutoscaler => "autoscaling/v1",
        }
    }
}

impl From<DeployMode> for ObjectKind {
    fn from(mode: DeployMode) -> Self {
        match mode {
            DeployMode::Deployment => Self::Deployment,
        }
    }
}

/// The label that doubles as every object's own label and as the pod selector.
pub fn service_labels(service_name: &str) -> BTreeMap<String, String> {
    BTreeMap::from([(LABEL_KEY.to_string(), service_name.to_string())])
}

fn object_meta(service_name: &str) -> ObjectMeta {
    ObjectMeta {
        name: Some(service_name.to_string()),
        namespace: Some(DEFAULT_NAMESPACE.to_string()),
        labels: Some(service_labels(service_name)),
        ..Default::default()
    }
}

pub fn image_reference(image_registry: &str, req: &DeploymentRequest) -> String {
    format!("{}{}:{}", image_registry, req.image_name, req.image_version)
}

/// Requests and limits share this map, so every pod lands in the Guaranteed QoS class.
pub fn resource_quantities(req: &DeploymentRequest) -> BTreeMap<String, Quantity> {
    BTreeMap::from([
        ("cpu".to_string(), Quantity(req.cpu.to_string())),
        (
            "memory".to_string(),
            Quantity(format!("{}{}", req.memory, MEMORY_UNIT)),
        ),
    ])
}

/// Builds the workload. Replicas always start at one; the autoscaler owns scaling.
pub fn build_deployment(req: &DeploymentRequest, image_registry: &str) -> Deployment {
    let labels = service_labels(&req.service_name);
    let resources = resource_quantities(req);

    Deployment {
        metadata: object_meta(&req.service_name),
        spec: Some(DeploymentSpec {
            replicas: Some(DEFAULT_REPLICAS),
            selector: LabelSelector {
                match_labels: Some(labels.clone()),
                ..Default::default()
            },
            template: PodTemplateSpec {
                metadata: Some(ObjectMeta {
                    labels: Some(labels),
                    ..Default::default()
                }),
                spec: Some(PodSpec {
                    containers: vec![Container {
                        name: req.service_name.clone(),
                        image: Some(image_reference(image_registry, req)),
                        image_pull_policy: Some(IMAGE_PULL_POLICY.to_string()),
                        ports: Some(vec![ContainerPort {
                            container_port: req.port,
                            ..Default::default()
                        }]),
                        resources: Some(ResourceRequirements {
                            requests: Some(resources.clone()),
                            limits: Some(resources),
                            ..Default::default()
                        }),
                        ..Default::default()
                    }],
                    ..Default::default()
                }),
            },
            ..Default::default()
        }),
        ..Default::default()
    }
}

pub fn build_service(req: &DeploymentRequest) -> Service {
    Service {
        metadata: object_meta(&req.service_name),
        spec: Some(ServiceSpec {
            type_: Some(SERVICE_TYPE.to_string()),
            selector: Some(service_labels(&req.service_name)),
            ports: Some(vec![ServicePort {
                port: req.port,
                target_port: Some(IntOrString::Int(req.port)),
                node_port: Some(req.node_port),
                ..Default::default()
            }]),
            ..Default::default()
        }),
        ..Default::default()
    }
}

/// Builds the autoscaler, pointed at the workload by kind and name rather than uid.
pub fn build_autoscaler(req: &DeploymentRequest) -> HorizontalPodAutoscaler {
    let target = ObjectKind::from(req.deploy_mode);

    HorizontalPodAutoscaler {
        metadata: object_meta(&req.service_name),
        spec: Some(HorizontalPodAutoscalerSpec {
            min_replicas: Some(req.min_replicas),
            max_replicas: req.max_replicas,
            scale_target_ref: CrossVersionObjectReference {
                api_version: Some(target.api_version().to_string()),
                kind: target.kind().to_string(),
                name: req.service_name.clone(),
            },
            target_cpu_utilization_percentage: Some(req.target_cpu_utilization_percentage),
        }),
        ..Default::default()
    }
}
