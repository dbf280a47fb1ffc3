pub mod payload;
pub mod performance;
pub mod signal;
pub mod stats;

pub use payload::WebhookPayload;
pub use performance::{PerformanceRecord, PerformanceStatus};
pub use signal::{NewSignal, Signal};
pub use stats::{AggregateStats, DashboardSnapshot, SymbolCount, SymbolStats};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use std::fmt;

// ---------------------------------------------------------------------------
// Action
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Action {
    Buy,
    Sell,
    Alert,
}

impl Action {
    /// Case-insensitive parse. Anything that is not BUY or SELL is an alert.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_uppercase().as_str() {
            "BUY" => Action::Buy,
            "SELL" => Action::Sell,
            _ => Action::Alert,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Buy => "BUY",
            Action::Sell => "SELL",
            Action::Alert => "ALERT",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Decimal columns
// ---------------------------------------------------------------------------
//
// SQLite has no exact numeric type, so decimals live in TEXT columns.

pub(crate) fn decimal_column(row: &SqliteRow, column: &str) -> Result<Decimal, sqlx::Error> {
    let raw: String = row.try_get(column)?;
    parse_decimal_column(column, &raw)
}

pub(crate) fn optional_decimal_column(
    row: &SqliteRow,
    column: &str,
) -> Result<Option<Decimal>, sqlx::Error> {
    let raw: Option<String> = row.try_get(column)?;
    raw.map(|s| parse_decimal_column(column, &s)).transpose()
}

fn parse_decimal_column(column: &str, raw: &str) -> Result<Decimal, sqlx::Error> {
    raw.parse::<Decimal>().map_err(|e| sqlx::Error::ColumnDecode {
        index: column.to_string(),
        source: Box::new(e),
    })
}
