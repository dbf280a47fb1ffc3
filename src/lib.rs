pub mod api;
pub mod config;
pub mod db;
pub mod errors;
pub mod ingestion;
pub mod metrics;
pub mod models;
pub mod services;

use std::sync::Arc;

use crate::config::AppConfig;
use crate::services::notifier::Notifier;

#[derive(Clone)]
pub struct AppState {
    pub db: sqlx::SqlitePool,
    pub config: AppConfig,
    pub metrics_handle: metrics_exporter_prometheus::PrometheusHandle,
    pub notifier: Arc<Notifier>,
}
