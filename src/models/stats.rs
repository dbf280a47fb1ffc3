use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row};

use super::{decimal_column, Signal};

/// Database row for the stats table: running counters for one symbol.
#[derive(Debug, Clone, Serialize)]
pub struct SymbolStats {
    pub id: i64,
    pub symbol: String,
    pub total_signals: i64,
    pub successful_signals: i64,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_profit: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub success_rate: Decimal,
    pub updated_at: DateTime<Utc>,
}

impl<'r> FromRow<'r, SqliteRow> for SymbolStats {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            symbol: row.try_get("symbol")?,
            total_signals: row.try_get("total_signals")?,
            successful_signals: row.try_get("successful_signals")?,
            total_profit: decimal_column(row, "total_profit")?,
            success_rate: decimal_column(row, "success_rate")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

/// Signal count for one symbol, derived from the signals table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct SymbolCount {
    pub symbol: String,
    pub count: i64,
}

/// Snapshot of the whole store.
#[derive(Debug, Clone, Serialize)]
pub struct AggregateStats {
    pub total_signals: i64,
    pub sent_signals: i64,
    pub by_symbol: Vec<SymbolCount>,
}

/// Dashboard counters plus the newest signals, all read from one state.
#[derive(Debug, Clone)]
pub struct DashboardSnapshot {
    pub total_signals: i64,
    pub sent_signals: i64,
    pub total_symbols: i64,
    pub recent_signals: Vec<Signal>,
}
