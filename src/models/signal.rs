use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row};

use super::{decimal_column, optional_decimal_column, Action, WebhookPayload};

/// Database row for the signals table.
#[derive(Debug, Clone, Serialize)]
pub struct Signal {
    pub id: i64,
    pub symbol: String,
    pub action: Action,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub rsi: Option<Decimal>,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub macd: Option<Decimal>,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub volume: Option<Decimal>,
    pub message: Option<String>,
    pub strategy: Option<String>,
    pub signal_count: Option<String>,
    pub created_at: DateTime<Utc>,
    /// Set once the notifier confirmed delivery. Never reverts.
    pub notified: bool,
}

impl<'r> FromRow<'r, SqliteRow> for Signal {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let action: String = row.try_get("action")?;

        Ok(Self {
            id: row.try_get("id")?,
            symbol: row.try_get("symbol")?,
            action: Action::parse(&action),
            price: decimal_column(row, "price")?,
            rsi: optional_decimal_column(row, "rsi")?,
            macd: optional_decimal_column(row, "macd")?,
            volume: optional_decimal_column(row, "volume")?,
            message: row.try_get("message")?,
            strategy: row.try_get("strategy")?,
            signal_count: row.try_get("signal_count")?,
            created_at: row.try_get("created_at")?,
            notified: row.try_get("sent_to_telegram")?,
        })
    }
}

/// A validated signal ready to be persisted.
///
/// Built once at the ingestion boundary from a [`WebhookPayload`]; everything
/// downstream works with this type or the persisted [`Signal`].
#[derive(Debug, Clone, PartialEq)]
pub struct NewSignal {
    pub symbol: String,
    pub action: Action,
    pub price: Decimal,
    pub rsi: Option<Decimal>,
    pub macd: Option<Decimal>,
    pub volume: Option<Decimal>,
    pub message: Option<String>,
    pub strategy: Option<String>,
    pub signal_count: Option<String>,
}

impl NewSignal {
    pub fn from_payload(payload: WebhookPayload) -> Self {
        let price = match payload.price {
            Some(p) if p.is_sign_negative() && !p.is_zero() => {
                tracing::warn!(price = %p, "Negative price in payload, storing 0");
                Decimal::ZERO
            }
            Some(p) => p,
            None => Decimal::ZERO,
        };

        Self {
            symbol: payload.symbol.unwrap_or_default(),
            action: payload
                .action
                .as_deref()
                .map(Action::parse)
                .unwrap_or(Action::Alert),
            price,
            rsi: payload.rsi,
            macd: payload.macd,
            volume: payload.volume,
            message: payload.message,
            strategy: payload.strategy,
            signal_count: payload.signals,
        }
    }

    pub fn has_symbol(&self) -> bool {
        !self.symbol.is_empty()
    }
}
