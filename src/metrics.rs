use metrics::{counter, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

/// Install the Prometheus exporter and register all application metrics.
/// Returns a `PrometheusHandle` whose `render()` method produces the
/// text/plain Prometheus scrape payload.
pub fn init_metrics() -> anyhow::Result<PrometheusHandle> {
    let handle = PrometheusBuilder::new().install_recorder()?;

    // Pre-register counters so they appear even before the first increment.
    counter!("webhook_requests_total").absolute(0);
    counter!("webhook_rejected_total").absolute(0);
    counter!("signals_recorded_total").absolute(0);
    counter!("stats_update_failures_total").absolute(0);
    counter!("notifications_sent_total").absolute(0);
    counter!("notifications_failed_total").absolute(0);

    // Histogram is lazily created on first record; force creation.
    histogram!("ingest_latency_seconds").record(0.0);

    Ok(handle)
}
