//! Route definitions and router construction.

use axum::Router;
use axum::http::HeaderValue;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::config::CorsConfig;
use crate::handlers;
use crate::state::AppState;

/// Build CORS layer from configuration.
fn build_cors_layer(config: &CorsConfig) -> CorsLayer {
    match config {
        CorsConfig::AllowAll => CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any),
        CorsConfig::AllowOrigins(origins) => {
            let allowed: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();
            CorsLayer::new()
                .allow_origin(allowed)
                .allow_methods(Any)
                .allow_headers(Any)
        }
    }
}

/// API routes without the `/api` prefix (nested by the caller).
fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/chat", post(handlers::chat))
        .route("/tts", post(handlers::tts))
        .fallback(handlers::api_not_found)
}

/// Create the full router: API, health, static assets, and SPA fallback.
///
/// `/assets/*` is served from `<static_dir>/assets` when the directory exists.
/// Any other unmatched path returns `index.html` (or a JSON notice when the
/// frontend is missing). Unknown `/api/*` paths return 404.
pub fn create_router(state: AppState, cors_config: &CorsConfig) -> Router {
    let cors = build_cors_layer(cors_config);

    let mut router = Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/api", api_routes());

    if let Some(dir) = &state.static_dir {
        let assets = dir.join("assets");
        if assets.is_dir() {
            tracing::info!(path = %assets.display(), "Serving static assets");
            router = router.nest_service("/assets", ServeDir::new(assets));
        } else {
            tracing::warn!(path = %dir.display(), "Frontend assets not found, serving API only");
        }
    }

    router
        .fallback(handlers::spa_fallback)
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
