use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::controllers::{health, story::StoryController};
use crate::infrastructure::config::Config;
use crate::infrastructure::repositories::StoryRepository;

pub mod request_id;

pub use request_id::request_id_middleware;

/// Largest JSON body accepted for an image of `max_image_bytes` sent as base64
pub fn body_limit(max_image_bytes: usize) -> usize {
    max_image_bytes / 3 * 4 + 64 * 1024
}

/// Application router with all routes and layers
pub fn build_app(
    story_controller: Arc<StoryController>,
    story_repo: Arc<dyn StoryRepository>,
    max_image_bytes: usize,
) -> Router {
    let story_routes = Router::new()
        .route("/api/stories", post(StoryController::create_story))
        .route("/api/stories/:id", get(StoryController::get_story))
        .route("/api/stories/:id/audio", get(StoryController::get_audio))
        .with_state(story_controller)
        .layer(DefaultBodyLimit::max(body_limit(max_image_bytes)));

    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::health_ready))
        .with_state(story_repo)
        .merge(story_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                // Browser clients upload straight from the capture page
                .layer(CorsLayer::permissive())
                .layer(middleware::from_fn(request_id_middleware)),
        )
}

/// Start the HTTP server with all routes configured
pub async fn start_http_server(
    config: Arc<Config>,
    app: Router,
) -> Result<(), Box<dyn std::error::Error>> {
    let listener =
        tokio::net::TcpListener::bind(format!("{}:{}", config.host, config.port)).await?;

    tracing::info!("Server listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}
