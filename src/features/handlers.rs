use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::json;
use tracing::debug;
use validator::Validate;

use crate::{
    features::schemas::{DeploymentRequest, ListResponse, MessageResponse},
    services::{containers::ContainerResolver, kubernetes::DeploymentService},
    utilities::{app_state::Cluster, config::Config, errors::AppError},
};

// ============================================
// DEPLOYMENT HANDLERS
// ============================================

pub async fn create_deployment_handler(
    State(cluster): State<Cluster>,
    State(config): State<Config>,
    Json(req): Json<DeploymentRequest>,
) -> Result<impl IntoResponse, AppError> {
    req.validate()?;

    let report = DeploymentService::create(cluster.as_ref(), &config.image_registry, &req).await?;

    Ok((StatusCode::CREATED, Json(report)))
}

pub async fn start_service_handler(
    State(cluster): State<Cluster>,
    State(config): State<Config>,
    Json(req): Json<DeploymentRequest>,
) -> Result<impl IntoResponse, AppError> {
    req.validate()?;

    DeploymentService::start(cluster.as_ref(), &config.image_registry, &req).await?;

    Ok((
        StatusCode::OK,
        Json(MessageResponse::new("Service started successfully")),
    ))
}

pub async fn delete_service_handler(
    State(cluster): State<Cluster>,
    Path(service_name): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    DeploymentService::delete(cluster.as_ref(), &service_name).await;

    Ok((
        StatusCode::OK,
        Json(MessageResponse::new("Service deleted successfully")),
    ))
}

// ============================================
// CONTAINER HANDLERS
// ============================================

pub async fn get_containers_handler(
    State(cluster): State<Cluster>,
    Path(service_name): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let containers = ContainerResolver::get_all_containers(cluster.as_ref(), &service_name).await?;

    debug!(
        "Resolved {} containers for service {}",
        containers.len(),
        service_name
    );

    Ok(Json(ListResponse {
        total: containers.len(),
        data: containers,
    }))
}

pub async fn get_logs_handler(
    Path((namespace, pod_name)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    Ok(DeploymentService::logs(&namespace, &pod_name))
}

pub async fn health_handler() -> impl IntoResponse {
    Json(json!({"status": "ok"}))
}
