use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row};

use super::optional_decimal_column;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PerformanceStatus {
    Open,
    Closed,
}

impl PerformanceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PerformanceStatus::Open => "OPEN",
            PerformanceStatus::Closed => "CLOSED",
        }
    }
}

/// Database row for the performance table. Entry/exit tracking for a signal.
#[derive(Debug, Clone, Serialize)]
pub struct PerformanceRecord {
    pub id: i64,
    pub signal_id: i64,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub entry_price: Option<Decimal>,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub exit_price: Option<Decimal>,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub profit_loss: Option<Decimal>,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub profit_pct: Option<Decimal>,
    pub status: PerformanceStatus,
    pub closed_at: Option<DateTime<Utc>>,
}

impl<'r> FromRow<'r, SqliteRow> for PerformanceRecord {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let status: String = row.try_get("status")?;
        let status = match status.as_str() {
            "OPEN" => PerformanceStatus::Open,
            "CLOSED" => PerformanceStatus::Closed,
            other => {
                return Err(sqlx::Error::ColumnDecode {
                    index: "status".into(),
                    source: format!("unknown performance status {other:?}").into(),
                })
            }
        };

        Ok(Self {
            id: row.try_get("id")?,
            signal_id: row.try_get("signal_id")?,
            entry_price: optional_decimal_column(row, "entry_price")?,
            exit_price: optional_decimal_column(row, "exit_price")?,
            profit_loss: optional_decimal_column(row, "profit_loss")?,
            profit_pct: optional_decimal_column(row, "profit_pct")?,
            status,
            closed_at: row.try_get("closed_at")?,
        })
    }
}
