pub mod features;
pub mod services;
pub mod utilities;

use axum::{
    Router,
    http::{HeaderValue, Method, header},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::utilities::{app_state::AppState, errors::AppError};

pub fn app(state: AppState) -> Result<Router, AppError> {
    let origin = state
        .config
        .frontend_endpoint
        .parse::<HeaderValue>()
        .map_err(|e| AppError::InternalError(format!("Invalid frontend endpoint, {}", e)))?;

    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE]);

    Ok(features::routes()
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state))
}
