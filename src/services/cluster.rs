//! Seam between the orchestration logic and the control plane.
//!
//! Everything above this module talks to [`ClusterClient`], so tests can swap
//! in a mock while production goes through [`KubeClusterClient`].

use async_trait::async_trait;
use k8s_openapi::api::apps::v1::{Deployment, ReplicaSet};
use k8s_openapi::api::autoscaling::v1::HorizontalPodAutoscaler;
use k8s_openapi::api::core::v1::{Pod, Service};
use kube::Api;
use kube::api::{DeleteParams, ListParams, PostParams};
use tracing::debug;

#[cfg(test)]
use mockall::automock;

use crate::services::build_kubernetes::Kubernetes;
use crate::services::resources::ObjectKind;
use crate::utilities::errors::AppError;

/// Namespaced operations on the object kinds this service manages.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ClusterClient: Send + Sync {
    async fn create_deployment(
        &self,
        namespace: &str,
        deployment: &Deployment,
    ) -> Result<(), AppError>;

    async fn create_service(&self, namespace: &str, service: &Service) -> Result<(), AppError>;

    /// Creates the autoscaler, or replaces it in place when one with the same name exists.
    async fn create_or_replace_autoscaler(
        &self,
        namespace: &str,
        autoscaler: &HorizontalPodAutoscaler,
    ) -> Result<(), AppError>;

    async fn delete_deployment(&self, namespace: &str, name: &str) -> Result<(), AppError>;

    async fn list_replica_sets(&self, namespace: &str) -> Result<Vec<ReplicaSet>, AppError>;

    async fn list_pods(&self, namespace: &str) -> Result<Vec<Pod>, AppError>;
}

/// Real Kubernetes client implementation
#[derive(Clone)]
pub struct KubeClusterClient {
    kubernetes: Kubernetes,
}

impl KubeClusterClient {
    pub fn new(kubernetes: Kubernetes) -> Self {
        Self { kubernetes }
    }

    async fn api<K>(&self, kind: ObjectKind, namespace: &str) -> Result<Api<K>, AppError>
    where
        K: kube::Resource<Scope = k8s_openapi::NamespaceResourceScope>,
        <K as kube::Resource>::DynamicType: Default,
    {
        let dynamic_type = Default::default();
        debug_assert_eq!(K::kind(&dynamic_type), kind.kind());
        debug_assert_eq!(K::api_version(&dynamic_type), kind.api_version());

        debug!(
            "Using {} {} api in namespace {}",
            kind.api_version(),
            kind.kind(),
            namespace
        );
        let client = self.kubernetes.client().await?;
        Ok(Api::namespaced(client, namespace))
    }
}

#[async_trait]
impl ClusterClient for KubeClusterClient {
    async fn create_deployment(
        &self,
        namespace: &str,
        deployment: &Deployment,
    ) -> Result<(), AppError> {
        let api: Api<Deployment> = self.api(ObjectKind::Deployment, namespace).await?;
        api.create(&PostParams::default(), deployment).await?;
        Ok(())
    }

    async fn create_service(&self, namespace: &str, service: &Service) -> Result<(), AppError> {
        let api: Api<Service> = self.api(ObjectKind::Service, namespace).await?;
        api.create(&PostParams::default(), service).await?;
        Ok(())
    }

    async fn create_or_replace_autoscaler(
        &self,
        namespace: &str,
        autoscaler: &HorizontalPodAutoscaler,
    ) -> Result<(), AppError> {
        let api: Api<HorizontalPodAutoscaler> = self.api(ObjectKind::HorizontalPodAutoscaler, namespace).await?;
        let name = autoscaler
            .metadata
            .name
            .as_deref()
            .ok_or_else(|| AppError::InternalError("autoscaler has no name".to_string()))?;

        match api.get_opt(name).await? {
            Some(existing) => {
                debug!("Replacing autoscaler {}", name);
                let mut replacement = autoscaler.clone();
                replacement.metadata.resource_version = existing.metadata.resource_version;
                api.replace(name, &PostParams::default(), &replacement)
                    .await?;
            }
            None => {
                api.create(&PostParams::default(), autoscaler).await?;
            }
        }

        Ok(())
    }

    async fn delete_deployment(&self, namespace: &str, name: &str) -> Result<(), AppError> {
        let api: Api<Deployment> = self.api(ObjectKind::Deployment, namespace).await?;
        api.delete(name, &DeleteParams::default()).await?;
        Ok(())
    }

    async fn list_replica_sets(&self, namespace: &str) -> Result<Vec<ReplicaSet>, AppError> {
        let api: Api<ReplicaSet> = self.api(ObjectKind::ReplicaSet, namespace).await?;
        let list = api.list(&ListParams::default()).await?;
        Ok(list.items)
    }

    async fn list_pods(&self, namespace: &str) -> Result<Vec<Pod>, AppError> {
        let api: Api<Pod> = self.api(ObjectKind::Pod, namespace).await?;
        let list = api.list(&ListParams::default()).await?;
        Ok(list.items)
    }
}
