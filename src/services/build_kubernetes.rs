use std::sync::Arc;

use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Client, Config as KubeConfig};
use tokio::sync::OnceCell;
use tracing::{error, info};

use crate::utilities::{config::Config, errors::AppError};

/// Lazily connected handle to the control plane.
///
/// The client is built on first use and memoized for the life of the process.
/// A failed build leaves the cell empty so the next caller tries again.
#[derive(Clone)]
pub struct Kubernetes {
    config: Arc<Config>,
    client: Arc<OnceCell<Client>>,
}

impl Kubernetes {
    pub fn new(config: &Config) -> Self {
        Self {
            config: Arc::new(config.clone()),
            client: Arc::new(OnceCell::new()),
        }
    }

    /// Handle around a client that is already built, e.g. one over a custom transport.
    pub fn with_client(config: &Config, client: Client) -> Self {
        Self {
            config: Arc::new(config.clone()),
            client: Arc::new(OnceCell::new_with(Some(client))),
        }
    }

    pub fn is_connected(&self) -> bool {
        self.client.initialized()
    }

    pub async fn client(&self) -> Result<Client, AppError> {
        let client = self
            .client
            .get_or_try_init(|| async {
                info!("Connecting to kubernetes control plane");
                match build_client(&self.config).await {
                    Ok(client) => {
                        info!("Kubernetes client ready");
                        Ok(client)
                    }
                    Err(e) => {
                        error!("Kubernetes connection failed, {}", e);
                        Err(e)
                    }
                }
            })
            .await?;

        Ok(client.clone())
    }
}

async fn build_client(config: &Config) -> Result<Client, AppError> {
    let kube_config = if let Some(master_url) = &config.k8s_master_url {
        // Explicit API server, the way the service was first deployed
        let mut kube_config = KubeConfig::new(master_url.parse()?);
        kube_config.accept_invalid_certs = config.k8s_accept_invalid_certs;
        kube_config
    } else if config.k8s_in_cluster {
        // Running inside Kubernetes cluster
        KubeConfig::incluster().map_err(|e| AppError::KubeConnectionError(e.to_string()))?
    } else if let Some(path) = &config.k8s_config_path {
        // Running outside cluster - use kubeconfig
        let kubeconfig = Kubeconfig::read_from(path)
            .map_err(|e| AppError::KubeConnectionError(e.to_string()))?;
        KubeConfig::from_custom_kubeconfig(kubeconfig, &KubeConfigOptions::default())
            .await
            .map_err(|e| AppError::KubeConnectionError(e.to_string()))?
    } else {
        KubeConfig::infer()
            .await
            .map_err(|e| AppError::KubeConnectionError(e.to_string()))?
    };

    Client::try_from(kube_config).map_err(|e| AppError::KubeConnectionError(e.to_string()))
}
