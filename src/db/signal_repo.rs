use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};

use crate::models::{AggregateStats, DashboardSnapshot, NewSignal, Signal, SymbolCount};

/// Insert a new signal and return the stored row.
pub async fn insert_signal(pool: &SqlitePool, signal: &NewSignal) -> anyhow::Result<Signal> {
    let stored = sqlx::query_as::<_, Signal>(
        r#"
        INSERT INTO signals (symbol, action, price, rsi, macd, volume, message, strategy, signal_count, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        RETURNING *
        "#,
    )
    .bind(&signal.symbol)
    .bind(signal.action.as_str())
    .bind(signal.price.to_string())
    .bind(signal.rsi.map(|d| d.to_string()))
    .bind(signal.macd.map(|d| d.to_string()))
    .bind(signal.volume.map(|d| d.to_string()))
    .bind(&signal.message)
    .bind(&signal.strategy)
    .bind(&signal.signal_count)
    .bind(Utc::now())
    .fetch_one(pool)
    .await?;

    Ok(stored)
}

/// Fetch a signal by id.
pub async fn get_signal(pool: &SqlitePool, id: i64) -> anyhow::Result<Option<Signal>> {
    let signal = sqlx::query_as::<_, Signal>("SELECT * FROM signals WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(signal)
}

/// Mark a signal as delivered.
///
/// Idempotent: returns `true` only for the call that flipped the flag,
/// `false` if it was already set or the id does not exist.
pub async fn mark_notified(pool: &SqlitePool, id: i64) -> anyhow::Result<bool> {
    let result = sqlx::query(
        "UPDATE signals SET sent_to_telegram = 1 WHERE id = ? AND sent_to_telegram = 0",
    )
    .bind(id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() == 1)
}

/// Get the N most recent signals, newest first.
pub async fn get_recent_signals(pool: &SqlitePool, limit: i64) -> anyhow::Result<Vec<Signal>> {
    let signals = sqlx::query_as::<_, Signal>(
        "SELECT * FROM signals ORDER BY created_at DESC, id DESC LIMIT ?",
    )
    .bind(limit.max(0))
    .fetch_all(pool)
    .await?;

    Ok(signals)
}

/// Count all stored signals.
pub async fn count_signals(pool: &SqlitePool) -> anyhow::Result<i64> {
    let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM signals")
        .fetch_one(pool)
        .await?;

    Ok(row.0)
}

/// Count distinct symbols seen so far.
pub async fn count_symbols(pool: &SqlitePool) -> anyhow::Result<i64> {
    let row: (i64,) = sqlx::query_as("SELECT COUNT(DISTINCT symbol) FROM signals")
        .fetch_one(pool)
        .await?;

    Ok(row.0)
}

/// Totals plus per-symbol counts, read inside one transaction so the three
/// numbers describe the same state.
pub async fn aggregate_stats(pool: &SqlitePool) -> anyhow::Result<AggregateStats> {
    let mut tx = pool.begin().await?;
    let stats = read_aggregate(&mut tx).await?;
    tx.commit().await?;

    Ok(stats)
}

/// Aggregates, distinct symbol count and the newest `recent_limit` signals
/// from a single read transaction.
pub async fn dashboard_snapshot(
    pool: &SqlitePool,
    recent_limit: i64,
) -> anyhow::Result<DashboardSnapshot> {
    let mut tx = pool.begin().await?;

    let stats = read_aggregate(&mut tx).await?;
    let recent_signals = sqlx::query_as::<_, Signal>(
        "SELECT * FROM signals ORDER BY created_at DESC, id DESC LIMIT ?",
    )
    .bind(recent_limit.max(0))
    .fetch_all(&mut *tx)
    .await?;

    tx.commit().await?;

    Ok(DashboardSnapshot {
        total_signals: stats.total_signals,
        sent_signals: stats.sent_signals,
        total_symbols: stats.by_symbol.len() as i64,
        recent_signals,
    })
}

async fn read_aggregate(conn: &mut SqliteConnection) -> anyhow::Result<AggregateStats> {
    let total: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM signals")
        .fetch_one(&mut *conn)
        .await?;

    let sent: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM signals WHERE sent_to_telegram = 1")
        .fetch_one(&mut *conn)
        .await?;

    let by_symbol = sqlx::query_as::<_, SymbolCount>(
        r#"
        SELECT symbol, COUNT(*) AS count
        FROM signals
        GROUP BY symbol
        ORDER BY count DESC, symbol ASC
        "#,
    )
    .fetch_all(&mut *conn)
    .await?;

    Ok(AggregateStats {
        total_signals: total.0,
        sent_signals: sent.0,
        by_symbol,
    })
}
