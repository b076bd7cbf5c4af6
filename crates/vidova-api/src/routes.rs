//! API routes.

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use crate::handlers::admin::reset_library;
use crate::handlers::auth::{login, me, register};
use crate::handlers::health::{health, root};
use crate::handlers::videos::{get_video, list_videos, stream_video, upload_video};
use crate::middleware::cors_layer;
use crate::state::AppState;
use crate::ws::ws_events;

/// Headroom above the media size cap for multipart framing and the
/// title field.
const MULTIPART_OVERHEAD: usize = 1024 * 1024;

/// Create the API router.
pub fn create_router(state: AppState) -> Router {
    let auth_routes = Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/me", get(me));

    let video_routes = Router::new()
        .route("/videos/upload", post(upload_video))
        .route("/videos", get(list_videos))
        .route("/videos/stream/:id", get(stream_video))
        .route("/videos/:id", get(get_video));

    let admin_routes = Router::new().route("/admin/reset", post(reset_library));

    let api_routes = Router::new()
        .merge(auth_routes)
        .merge(video_routes)
        .merge(admin_routes);

    let body_limit = state.config.max_upload_bytes + MULTIPART_OVERHEAD;

    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/ws", get(ws_events))
        .nest("/api", api_routes)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&state.config.cors_origins))
        .with_state(state)
}
