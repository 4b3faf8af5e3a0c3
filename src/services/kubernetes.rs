use tracing::{debug, info, warn};

use crate::features::models::ProvisionStep;
use crate::features::schemas::{DeploymentRequest, ProvisionReport};
use crate::services::cluster::ClusterClient;
use crate::services::resources::{
    DEFAULT_NAMESPACE, build_autoscaler, build_deployment, build_service,
};
use crate::utilities::errors::AppError;

/// Returned by the log endpoint until log streaming is wired up.
pub const LOG_PLACEHOLDER: &str = "log is empty";

pub struct DeploymentService;

impl DeploymentService {
    /// Create the Deployment, Service and autoscaler for a request, in that order.
    ///
    /// Steps that succeeded before a failure are left in place. The error names
    /// the failed step and the steps already applied.
    pub async fn create(
        cluster: &dyn ClusterClient,
        image_registry: &str,
        req: &DeploymentRequest,
    ) -> Result<ProvisionReport, AppError> {
        let namespace = DEFAULT_NAMESPACE;
        let mut completed_steps = Vec::with_capacity(3);

        info!("Creating deployment, serviceName={}", req.service_name);
        let deployment = build_deployment(req, image_registry);
        debug!("Deployment spec: {:?}", deployment);
        cluster
            .create_deployment(namespace, &deployment)
            .await
            .map_err(|e| partial(ProvisionStep::Deployment, &completed_steps, e))?;
        completed_steps.push(ProvisionStep::Deployment);

        info!("Creating service, serviceName={}", req.service_name);
        let service = build_service(req);
        debug!("Service spec: {:?}", service);
        cluster
            .create_service(namespace, &service)
            .await
            .map_err(|e| partial(ProvisionStep::Service, &completed_steps, e))?;
        completed_steps.push(ProvisionStep::Service);

        info!("Creating autoscaler, serviceName={}", req.service_name);
        let autoscaler = build_autoscaler(req);
        debug!("Autoscaler spec: {:?}", autoscaler);
        cluster
            .create_or_replace_autoscaler(namespace, &autoscaler)
            .await
            .map_err(|e| partial(ProvisionStep::Autoscaler, &completed_steps, e))?;
        completed_steps.push(ProvisionStep::Autoscaler);

        info!("Provisioning complete, serviceName={}", req.service_name);

        Ok(ProvisionReport {
            service_name: req.service_name.clone(),
            completed_steps,
        })
    }

    /// Re-submit the Deployment only. The Service and autoscaler are expected to
    /// exist already; an existing Deployment is reported as a conflict.
    pub async fn start(
        cluster: &dyn ClusterClient,
        image_registry: &str,
        req: &DeploymentRequest,
    ) -> Result<(), AppError> {
        info!("Starting service, serviceName={}", req.service_name);

        let deployment = build_deployment(req, image_registry);
        cluster
            .create_deployment(DEFAULT_NAMESPACE, &deployment)
            .await?;

        Ok(())
    }

    /// Delete the Deployment only, leaving the Service and autoscaler behind.
    /// Failures are logged and never returned.
    pub async fn delete(cluster: &dyn ClusterClient, service_name: &str) {
        match cluster
            .delete_deployment(DEFAULT_NAMESPACE, service_name)
            .await
        {
            Ok(()) => info!("Deleted deployment, serviceName={}", service_name),
            Err(e) => warn!(
                "Delete deployment failed, serviceName={}, {}",
                service_name, e
            ),
        }
    }

    pub fn logs(namespace: &str, pod_name: &str) -> String {
        debug!("Log requested, namespace={}, podName={}", namespace, pod_name);
        LOG_PLACEHOLDER.to_string()
    }
}

fn partial(
    failed_step: ProvisionStep,
    completed_steps: &[ProvisionStep],
    source: AppError,
) -> AppError {
    warn!(
        "Provisioning failed at {} after {:?}, {}",
        failed_step, completed_steps, source
    );
    AppError::PartialProvisioning {
        failed_step,
        completed_steps: completed_steps.to_vec(),
        source: Box::new(source),
    }
}
