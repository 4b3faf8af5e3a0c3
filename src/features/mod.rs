pub mod handlers;
pub mod models;
pub mod schemas;

use axum::{
    Router,
    routing::{delete, get, post},
};

use crate::utilities::app_state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health_handler))
        .route(
            "/api/v1/deployments",
            post(handlers::create_deployment_handler),
        )
        .route(
            "/api/v1/services/start",
            post(handlers::start_service_handler),
        )
        .route(
            "/api/v1/services/{service_name}",
            delete(handlers::delete_service_handler),
        )
        .route(
            "/api/v1/services/{service_name}/containers",
            get(handlers::get_containers_handler),
        )
        .route(
            "/api/v1/logs/{namespace}/{pod_name}",
            get(handlers::get_logs_handler),
        )
}
