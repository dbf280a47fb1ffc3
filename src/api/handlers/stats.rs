use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;

use crate::db::{signal_repo, stats_repo};
use crate::errors::AppError;
use crate::models::{SymbolCount, SymbolStats};
use crate::AppState;

#[derive(Serialize)]
pub struct StatsResponse {
    pub success: bool,
    pub total_signals: i64,
    pub sent_signals: i64,
    pub by_symbol: Vec<SymbolCount>,
}

/// GET /stats — Totals and per-symbol signal counts.
pub async fn summary(State(state): State<AppState>) -> Result<Json<StatsResponse>, AppError> {
    let stats = signal_repo::aggregate_stats(&state.db).await?;

    Ok(Json(StatsResponse {
        success: true,
        total_signals: stats.total_signals,
        sent_signals: stats.sent_signals,
        by_symbol: stats.by_symbol,
    }))
}

/// GET /stats/:symbol — Running counters for one symbol.
pub async fn symbol(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
) -> Result<Json<SymbolStats>, AppError> {
    stats_repo::get_stats(&state.db, &symbol)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("no stats for {symbol}")))
}
