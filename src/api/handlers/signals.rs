use axum::extract::{Query, State};
use axum::Json;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::db::signal_repo;
use crate::errors::AppError;
use crate::models::{Action, Signal};
use crate::AppState;

const DEFAULT_LIMIT: i64 = 50;
const MAX_LIMIT: i64 = 500;

/// Public shape of a stored signal.
#[derive(Debug, Serialize)]
pub struct SignalView {
    pub id: i64,
    pub symbol: String,
    pub action: Action,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub rsi: Option<Decimal>,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub macd: Option<Decimal>,
    pub timestamp: DateTime<Utc>,
    pub sent_to_telegram: bool,
}

impl From<Signal> for SignalView {
    fn from(s: Signal) -> Self {
        Self {
            id: s.id,
            symbol: s.symbol,
            action: s.action,
            price: s.price,
            rsi: s.rsi,
            macd: s.macd,
            timestamp: s.created_at,
            sent_to_telegram: s.notified,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub limit: Option<i64>,
}

#[derive(Serialize)]
pub struct SignalList {
    pub success: bool,
    pub count: usize,
    pub signals: Vec<SignalView>,
}

/// GET /signals — Most recent signals, newest first.
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<SignalList>, AppError> {
    let limit = params.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
    let signals = signal_repo::get_recent_signals(&state.db, limit).await?;

    Ok(Json(SignalList {
        success: true,
        count: signals.len(),
        signals: signals.into_iter().map(SignalView::from).collect(),
    }))
}
