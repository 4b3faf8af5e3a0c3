use std::{path::Path, str::FromStr};

use tokio::fs;
use tracing::Level;

use crate::utilities::errors::AppError;

#[derive(Clone, Debug)]
pub struct Config {
    pub server_address: String,
    pub frontend_endpoint: String,

    pub tracing_level: Level,

    // KUBERNETES
    pub image_registry: String,
    pub k8s_master_url: Option<String>,
    pub k8s_in_cluster: bool,
    pub k8s_config_path: Option<String>,
    pub k8s_accept_invalid_certs: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_address: "0.0.0.0:8001".to_string(),
            frontend_endpoint: "http://localhost:5173".to_string(),
            tracing_level: Level::DEBUG,
            image_registry: String::new(),
            k8s_master_url: None,
            k8s_in_cluster: false,
            k8s_config_path: None,
            k8s_accept_invalid_certs: true,
        }
    }
}

impl Config {
    pub async fn init() -> Result<Self, AppError> {
        Self::from_sources(Path::new(SECRETS_DIR)).await
    }

    /// Overlays docker secrets under `secrets_dir` and env vars on [`Config::default`].
    pub async fn from_sources(secrets_dir: &Path) -> Result<Self, AppError> {
        let defaults = Config::default();
        let source = ConfigSource { secrets_dir };

        Ok(Config {
            server_address: source
                .value("SERVER_ADDRESS")
                .await?
                .unwrap_or(defaults.server_address),
            frontend_endpoint: source
                .value("FRONTEND_ENDPOINT")
                .await?
                .unwrap_or(defaults.frontend_endpoint),
            tracing_level: source
                .value("TRACING_LEVEL")
                .await?
                .unwrap_or(defaults.tracing_level),
            // Prepended verbatim, so it carries its own trailing slash.
            image_registry: source
                .value("K8S_IMAGE_REGISTRY")
                .await?
                .unwrap_or(defaults.image_registry),
            k8s_master_url: source.value("K8S_MASTER_URL").await?,
            k8s_in_cluster: source
                .value("K8S_IN_CLUSTER")
                .await?
                .unwrap_or(defaults.k8s_in_cluster),
            k8s_config_path: source.value("K8S_KUBECONFIG").await?,
            k8s_accept_invalid_certs: source
                .value("K8S_ACCEPT_INVALID_CERTS")
                .await?
                .unwrap_or(defaults.k8s_accept_invalid_certs),
        })
    }
}

const SECRETS_DIR: &str = "/run/secrets";

struct ConfigSource<'a> {
    secrets_dir: &'a Path,
}

impl ConfigSource<'_> {
    /// A secret file named `name` wins over the env var of the same name.
    /// Blank values count as unset; values that fail to parse are errors.
    async fn value<T: FromStr>(&self, name: &str) -> Result<Option<T>, AppError> {
        let secret = self.secrets_dir.join(name);
        let raw = if fs::try_exists(&secret).await? {
            Some(fs::read_to_string(&secret).await.map_err(|e| {
                AppError::FileReadError(format!("{}, {}", secret.display(), e))
            })?)
        } else {
            std::env::var(name).ok()
        };

        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(value) => T::from_str(value)
                .map(Some)
                .map_err(|_| AppError::InvalidConfigValue(format!("{name}={value}"))),
        }
    }
}
