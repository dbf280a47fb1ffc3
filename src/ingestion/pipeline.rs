use std::time::Instant;

use chrono::{Local, NaiveDateTime};
use metrics::{counter, histogram};
use serde::Serialize;
use sqlx::SqlitePool;

use crate::db::{signal_repo, stats_repo};
use crate::models::payload::EmptyPayload;
use crate::models::{NewSignal, WebhookPayload};
use crate::services::formatter::format_signal_message;
use crate::services::notifier::Notifier;

#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    /// Body was empty or not a usable JSON object. Nothing was written.
    #[error(transparent)]
    Validation(#[from] EmptyPayload),

    /// The signal could not be stored. No notification was attempted.
    #[error("failed to record signal")]
    Persistence(#[source] anyhow::Error),
}

/// Result of one webhook: whether it was recorded and whether it was delivered
/// are reported separately.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IngestOutcome {
    pub signal_id: i64,
    pub delivered: bool,
}

/// Run a raw webhook body through the pipeline using the local wall clock
/// for the message timestamp.
pub async fn ingest(
    pool: &SqlitePool,
    notifier: &Notifier,
    body: &[u8],
) -> Result<IngestOutcome, IngestError> {
    counter!("webhook_requests_total").increment(1);

    let payload = WebhookPayload::from_body(body).map_err(|e| {
        counter!("webhook_rejected_total").increment(1);
        tracing::warn!(bytes = body.len(), "Webhook request carried no usable data");
        e
    })?;

    process_payload(pool, notifier, payload, Local::now().naive_local()).await
}

/// Process a parsed webhook:
/// 1. Normalize into a NewSignal
/// 2. Persist it (fatal on failure)
/// 3. Bump the symbol's stats (best effort)
/// 4. Render the message from the stored row
/// 5. Deliver and, on success, flag the row as notified
pub async fn process_payload(
    pool: &SqlitePool,
    notifier: &Notifier,
    payload: WebhookPayload,
    now: NaiveDateTime,
) -> Result<IngestOutcome, IngestError> {
    let start = Instant::now();

    // Step 1: Normalize
    let new_signal = NewSignal::from_payload(payload);

    tracing::info!(
        symbol = %new_signal.symbol,
        action = %new_signal.action,
        price = %new_signal.price,
        "Webhook signal received"
    );

    // Step 2: Persist
    let signal = signal_repo::insert_signal(pool, &new_signal)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, symbol = %new_signal.symbol, "Failed to record signal");
            IngestError::Persistence(e)
        })?;

    counter!("signals_recorded_total").increment(1);
    tracing::info!(signal_id = signal.id, "Signal recorded");

    // Step 3: Stats
    if new_signal.has_symbol() {
        if let Err(e) = stats_repo::increment_stats(pool, &signal.symbol).await {
            counter!("stats_update_failures_total").increment(1);
            tracing::error!(
                error = %e,
                signal_id = signal.id,
                symbol = %signal.symbol,
                "Failed to update symbol stats"
            );
        }
    }

    // Step 4: Render
    let message = format_signal_message(&signal, now);

    // Step 5: Deliver
    let delivered = notifier.send(&message).await;

    if delivered {
        match signal_repo::mark_notified(pool, signal.id).await {
            Ok(true) => {}
            Ok(false) => {
                tracing::debug!(signal_id = signal.id, "Signal already marked as notified");
            }
            Err(e) => {
                tracing::error!(
                    error = %e,
                    signal_id = signal.id,
                    "Notification delivered but delivery flag not saved"
                );
            }
        }
    } else {
        tracing::warn!(signal_id = signal.id, "Signal recorded but not delivered");
    }

    histogram!("ingest_latency_seconds").record(start.elapsed().as_secs_f64());

    Ok(IngestOutcome {
        signal_id: signal.id,
        delivered,
    })
}
