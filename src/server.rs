use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse},
    routing::get,
    Json, Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info};

use crate::config::Config;
use crate::gallery;
use crate::page;
use crate::s3::ObjectStore;
use crate::types::PageData;
use crate::upload;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ObjectStore>,
    pub config: Arc<Config>,
}

/// Create the HTTP router
pub fn create_router(store: Arc<dyn ObjectStore>, config: Arc<Config>) -> Router {
    let state = AppState { store, config };

    Router::new()
        .route("/", get(render_page))
        .route("/api/page", get(page_data))
        .route("/health", get(health_check))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy"
    }))
}

/// Assemble one render cycle: a fresh upload ticket plus the recent
/// gallery entries. A signing failure for the upload ticket is fatal to
/// the render; a listing or batch-signing failure degrades to an empty
/// gallery inside `gallery::recent_images`.
async fn build_page(state: &AppState) -> Result<PageData, (StatusCode, String)> {
    let upload = upload::prepare_upload(state.store.as_ref(), state.config.upload_url_expiry)
        .await
        .map_err(|e| {
            error!("Failed to generate pre-signed URL: {:#}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to generate pre-signed URL: {}", e),
            )
        })?;

    let images = gallery::recent_images(state.store.as_ref(), state.config.read_url_expiry).await;

    info!(
        "Rendered page: upload key {}, {} gallery entries",
        upload.key,
        images.len()
    );

    Ok(PageData { upload, images })
}

/// Server-rendered gallery page
async fn render_page(State(state): State<AppState>) -> Result<Html<String>, (StatusCode, String)> {
    let data = build_page(&state).await?;
    Ok(Html(page::render(&data)))
}

/// Same render cycle as JSON, consumed by the terminal client
async fn page_data(State(state): State<AppState>) -> Result<Json<PageData>, (StatusCode, String)> {
    let data = build_page(&state).await?;
    Ok(Json(data))
}
