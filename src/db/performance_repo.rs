use rust_decimal::Decimal;
use sqlx::SqlitePool;

use crate::models::{PerformanceRecord, PerformanceStatus};

/// Start tracking a signal at its entry price.
pub async fn open_record(
    pool: &SqlitePool,
    signal_id: i64,
    entry_price: Decimal,
) -> anyhow::Result<PerformanceRecord> {
    let record = sqlx::query_as::<_, PerformanceRecord>(
        r#"
        INSERT INTO performance (signal_id, entry_price, status)
        VALUES (?, ?, ?)
        RETURNING *
        "#,
    )
    .bind(signal_id)
    .bind(entry_price.to_string())
    .bind(PerformanceStatus::Open.as_str())
    .fetch_one(pool)
    .await?;

    Ok(record)
}

/// Fetch the performance record linked to a signal, if any.
pub async fn get_for_signal(
    pool: &SqlitePool,
    signal_id: i64,
) -> anyhow::Result<Option<PerformanceRecord>> {
    let record = sqlx::query_as::<_, PerformanceRecord>(
        "SELECT * FROM performance WHERE signal_id = ?",
    )
    .bind(signal_id)
    .fetch_optional(pool)
    .await?;

    Ok(record)
}
