use axum::{Json, http::StatusCode, response::IntoResponse, response::Response};
use serde_json::json;

use crate::features::models::ProvisionStep;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("File read error, {0}")]
    FileReadError(String),
    #[error("Invalid config value, {0}")]
    InvalidConfigValue(String),
    #[error("IO error, {0}")]
    IoError(#[from] std::io::Error),
    #[error("Invalid cluster url error: {0}")]
    InvalidClusterUrl(#[from] axum::http::uri::InvalidUri),
    #[error("Kubernetes connection error, {0}")]
    KubeConnectionError(String),
    #[error("Kube error: {0}")]
    KubeError(#[from] kube::Error),
    #[error("Provisioning stopped at {failed_step} after {completed_steps:?}: {source}")]
    PartialProvisioning {
        failed_step: ProvisionStep,
        completed_steps: Vec<ProvisionStep>,
        #[source]
        source: Box<AppError>,
    },
    #[error("Timestamp parse error: {0}")]
    TimestampParseError(#[from] chrono::ParseError),
    #[error("Serde json error: {0}")]
    SerdejsonError(#[from] serde_json::Error),
    #[error("Validation errors, {0}")]
    ValidatorValidationErrors(#[from] validator::ValidationErrors),
    #[error("{0}")]
    NotFoundError(String),
    #[error("Internal error, {0}")]
    InternalError(String),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::FileReadError(_)
            | Self::InvalidConfigValue(_)
            | Self::IoError(_)
            | Self::InvalidClusterUrl(_)
            | Self::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::KubeConnectionError(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::KubeError(kube::Error::Api(status)) => match status.code {
                404 => StatusCode::NOT_FOUND,
                409 => StatusCode::CONFLICT,
                422 => StatusCode::UNPROCESSABLE_ENTITY,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::KubeError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::PartialProvisioning { source, .. } => source.status_code(),
            Self::TimestampParseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::SerdejsonError(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::ValidatorValidationErrors(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::NotFoundError(_) => StatusCode::NOT_FOUND,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let body = match &self {
            Self::PartialProvisioning {
                failed_step,
                completed_steps,
                source,
            } => Json(json!({
                "error": source.to_string(),
                "failedStep": failed_step,
                "completedSteps": completed_steps,
            })),
            _ => Json(json!({"error": self.to_string()})),
        };

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api_error(code: u16, reason: &str) -> AppError {
        let status = serde_json::from_value(json!({
            "kind": "Status",
            "apiVersion": "v1",
            "status": "Failure",
            "message": "rejected",
            "reason": reason,
            "code": code,
        }))
        .unwrap();
        AppError::KubeError(kube::Error::Api(status))
    }

    #[test]
    fn kube_conflict_maps_to_409() {
        assert_eq!(
            api_error(409, "AlreadyExists").status_code(),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn kube_not_found_maps_to_404() {
        assert_eq!(
            api_error(404, "NotFound").status_code(),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn partial_provisioning_takes_status_of_source() {
        let err = AppError::PartialProvisioning {
            failed_step: ProvisionStep::Service,
            completed_steps: vec![ProvisionStep::Deployment],
            source: Box::new(api_error(409, "AlreadyExists")),
        };

        assert_eq!(err.status_code(), StatusCode::CONFLICT);
        assert!(err.to_string().contains("service"));
    }

    #[test]
    fn connection_error_is_service_unavailable() {
        let err = AppError::KubeConnectionError("no kubeconfig".to_string());
        assert_eq!(err.status_code(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
