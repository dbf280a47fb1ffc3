use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::AppState;
use super::auth::require_webhook_secret;
use super::handlers;

pub fn create_router(state: AppState) -> Router {
    // Read-only routes
    let public = Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/metrics", get(handlers::metrics::render))
        .route("/signals", get(handlers::signals::list))
        .route("/stats", get(handlers::stats::summary))
        .route("/stats/:symbol", get(handlers::stats::symbol))
        .route("/api/dashboard/summary", get(handlers::dashboard::summary));

    // Ingestion, guarded by WEBHOOK_SECRET when set
    let ingest = Router::new()
        .route("/webhook", post(handlers::webhook::receive))
        .layer(middleware::from_fn_with_state(state.clone(), require_webhook_secret));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    public
        .merge(ingest)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
