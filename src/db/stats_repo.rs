use chrono::Utc;
use sqlx::SqlitePool;

use crate::models::SymbolStats;

/// Count one more signal for `symbol`, creating its row on first use.
///
/// Single upsert statement, so concurrent calls for the same symbol cannot
/// lose an increment.
pub async fn increment_stats(pool: &SqlitePool, symbol: &str) -> anyhow::Result<SymbolStats> {
    let stats = sqlx::query_as::<_, SymbolStats>(
        r#"
        INSERT INTO stats (symbol, total_signals, updated_at)
        VALUES (?, 1, ?)
        ON CONFLICT (symbol) DO UPDATE
            SET total_signals = total_signals + 1,
                updated_at = excluded.updated_at
        RETURNING *
        "#,
    )
    .bind(symbol)
    .bind(Utc::now())
    .fetch_one(pool)
    .await?;

    Ok(stats)
}

/// Fetch the stats row for a symbol.
pub async fn get_stats(pool: &SqlitePool, symbol: &str) -> anyhow::Result<Option<SymbolStats>> {
    let stats = sqlx::query_as::<_, SymbolStats>("SELECT * FROM stats WHERE symbol = ?")
        .bind(symbol)
        .fetch_optional(pool)
        .await?;

    Ok(stats)
}
