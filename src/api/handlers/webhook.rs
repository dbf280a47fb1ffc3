use axum::body::Bytes;
use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::errors::AppError;
use crate::ingestion::pipeline;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct WebhookResponse {
    pub success: bool,
    pub signal_id: i64,
    pub sent_to_telegram: bool,
}

/// POST /webhook — Record a charting alert and forward it to Telegram.
///
/// The body is taken raw so that empty or non-JSON bodies produce the same
/// 400 `No data` regardless of content type.
pub async fn receive(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<WebhookResponse>, AppError> {
    let outcome = pipeline::ingest(&state.db, &state.notifier, &body).await?;

    Ok(Json(WebhookResponse {
        success: true,
        signal_id: outcome.signal_id,
        sent_to_telegram: outcome.delivered,
    }))
}
