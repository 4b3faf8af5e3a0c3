use std::sync::Arc;

use axum::extract::FromRef;

use crate::{
    services::{
        build_kubernetes::Kubernetes,
        cluster::{ClusterClient, KubeClusterClient},
    },
    utilities::config::Config,
};

pub type Cluster = Arc<dyn ClusterClient>;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub cluster: Cluster,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let kubernetes = Kubernetes::new(&config);
        let cluster = Arc::new(KubeClusterClient::new(kubernetes));
        Self { config, cluster }
    }

    pub fn with_cluster(config: Config, cluster: Cluster) -> Self {
        Self { config, cluster }
    }
}

impl FromRef<AppState> for Cluster {
    fn from_ref(state: &AppState) -> Self {
        state.cluster.clone()
    }
}

impl FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}
