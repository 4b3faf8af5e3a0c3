use cluster_deployer::{
    app,
    utilities::{app_state::AppState, config::Config, errors::AppError},
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();

    let _ = rustls::crypto::ring::default_provider().install_default();

    let config = Config::init().await?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::default().add_directive(config.tracing_level.into())),
        )
        .init();

    let server_address = config.server_address.clone();
    let router = app(AppState::new(config))?;

    let listener = tokio::net::TcpListener::bind(&server_address).await?;
    info!("Listening on {}", server_address);

    axum::serve(listener, router).await?;

    Ok(())
}
