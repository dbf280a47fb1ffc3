use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::db::signal_repo;
use crate::errors::AppError;
use crate::AppState;

use super::signals::SignalView;

const RECENT_SIGNALS: i64 = 10;

#[derive(Serialize)]
pub struct DashboardSummary {
    pub total_signals: i64,
    pub sent_signals: i64,
    pub total_symbols: i64,
    pub recent_signals: Vec<SignalView>,
}

/// GET /api/dashboard/summary — Counters and the latest signals.
pub async fn summary(State(state): State<AppState>) -> Result<Json<DashboardSummary>, AppError> {
    let snapshot = signal_repo::dashboard_snapshot(&state.db, RECENT_SIGNALS).await?;

    Ok(Json(DashboardSummary {
        total_signals: snapshot.total_signals,
        sent_signals: snapshot.sent_signals,
        total_symbols: snapshot.total_symbols,
        recent_signals: snapshot
            .recent_signals
            .into_iter()
            .map(SignalView::from)
            .collect(),
    }))
}
