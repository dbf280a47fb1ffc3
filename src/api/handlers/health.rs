use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use serde_json::json;

use crate::db;
use crate::AppState;

pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let db_ok = db::ping(&state.db).await;
    let telegram = if state.notifier.is_configured() {
        "configured"
    } else {
        "not_configured"
    };

    let (status, health, database) = if db_ok {
        (StatusCode::OK, "healthy", "connected")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "unhealthy", "disconnected")
    };

    (
        status,
        Json(json!({
            "status": health,
            "timestamp": Utc::now().to_rfc3339(),
            "telegram": telegram,
            "database": database,
        })),
    )
}
