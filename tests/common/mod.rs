use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use metrics_exporter_prometheus::PrometheusBuilder;
use serde_json::{json, Value};
use sqlx::SqlitePool;
use tempfile::TempDir;

use signal_relay::config::AppConfig;
use signal_relay::services::notifier::{Notifier, TelegramCredentials};
use signal_relay::AppState;

pub const TEST_BOT_TOKEN: &str = "123456:TEST_TOKEN";
pub const TEST_CHAT_ID: &str = "-1001234567890";

/// A migrated SQLite database in a temp directory. The directory lives as
/// long as this value.
pub struct TestDb {
    pub pool: SqlitePool,
    _dir: TempDir,
}

/// Create a fresh database file and run all migrations.
#[allow(dead_code)]
pub async fn setup_test_db() -> TestDb {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let url = format!("sqlite://{}", dir.path().join("relay_test.db").display());

    let pool = signal_relay::db::init_pool(&url, 5)
        .await
        .expect("Failed to open test database");

    TestDb { pool, _dir: dir }
}

/// Fake Telegram Bot API that answers `sendMessage` with a fixed status,
/// optionally after a delay, and records every request it sees.
#[allow(dead_code)]
pub struct MockTelegram {
    pub base_url: String,
    received: Arc<Mutex<Vec<Value>>>,
}

#[allow(dead_code)]
impl MockTelegram {
    /// Requests received so far as `{"bot": <path segment>, "body": <json>}`.
    pub fn requests(&self) -> Vec<Value> {
        self.received.lock().unwrap().clone()
    }
}

#[derive(Clone)]
struct MockState {
    status: StatusCode,
    delay: Duration,
    received: Arc<Mutex<Vec<Value>>>,
}

async fn mock_send_message(
    State(state): State<MockState>,
    Path(bot): Path<String>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    tokio::time::sleep(state.delay).await;
    state
        .received
        .lock()
        .unwrap()
        .push(json!({ "bot": bot, "body": body }));

    let ok = state.status == StatusCode::OK;
    (state.status, Json(json!({ "ok": ok })))
}

#[allow(dead_code)]
pub async fn spawn_mock_telegram(status: StatusCode, delay: Duration) -> MockTelegram {
    let received = Arc::new(Mutex::new(Vec::new()));
    let state = MockState {
        status,
        delay,
        received: Arc::clone(&received),
    };

    let app = Router::new()
        .route("/:bot/sendMessage", post(mock_send_message))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind mock Telegram");
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.ok();
    });

    MockTelegram {
        base_url: format!("http://{addr}"),
        received,
    }
}

/// Notifier pointed at `api_base` with test credentials.
#[allow(dead_code)]
pub fn notifier_for(api_base: &str, timeout: Duration, max_in_flight: usize) -> Notifier {
    Notifier::new(
        api_base,
        Some(TelegramCredentials {
            bot_token: TEST_BOT_TOKEN.into(),
            chat_id: TEST_CHAT_ID.into(),
        }),
        timeout,
        max_in_flight,
    )
    .expect("Failed to build notifier")
}

/// Notifier without credentials: every send returns false.
#[allow(dead_code)]
pub fn unconfigured_notifier() -> Notifier {
    Notifier::new("http://127.0.0.1:9", None, Duration::from_secs(1), 1)
        .expect("Failed to build notifier")
}

/// Minimal config for tests.
#[allow(dead_code)]
pub fn test_config(webhook_secret: Option<&str>) -> AppConfig {
    AppConfig {
        database_url: "sqlite::memory:".into(),
        database_max_connections: 5,
        host: "127.0.0.1".into(),
        port: 0,
        telegram_bot_token: None,
        telegram_chat_id: None,
        telegram_api_base: "http://127.0.0.1:9".into(),
        notifier_timeout_secs: 2,
        notifier_max_in_flight: 4,
        startup_notification: false,
        webhook_secret: webhook_secret.map(str::to_string),
        log_json: false,
    }
}

#[allow(dead_code)]
pub fn build_state(pool: SqlitePool, notifier: Notifier, config: AppConfig) -> AppState {
    // Recorder is not installed globally: tests run in one process and only
    // one global recorder may exist.
    let metrics_handle = PrometheusBuilder::new().build_recorder().handle();

    AppState {
        db: pool,
        config,
        metrics_handle,
        notifier: Arc::new(notifier),
    }
}
