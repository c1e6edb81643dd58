use anyhow::Result;
use s3_gallery::{Config, S3Client};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting Image Gallery Server");

    // Configuration comes from the environment (GALLERY_BUCKET, PORT, ...)
    let config = Arc::new(Config::from_env()?);

    // Load AWS configuration and build the store capability
    let aws_config = aws_config::load_from_env().await;
    let store = S3Client::new(aws_sdk_s3::Client::new(&aws_config), config.bucket.clone());
    let store = Arc::new(store);

    // Create HTTP server
    let app = s3_gallery::server::create_router(store, config.clone());

    let addr = format!("0.0.0.0:{}", config.port);
    info!("Server listening on {}", addr);

    // Start server
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
