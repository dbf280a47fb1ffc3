mod common;

use std::time::Duration;

use axum::http::StatusCode;
use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;

use signal_relay::db::{signal_repo, stats_repo};
use signal_relay::ingestion::pipeline::{ingest, process_payload, IngestError};
use signal_relay::models::{Action, WebhookPayload};

fn fixed_now() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 6, 1)
        .unwrap()
        .and_hms_opt(10, 30, 0)
        .unwrap()
}

fn payload(json: &str) -> WebhookPayload {
    WebhookPayload::from_body(json.as_bytes()).expect("Payload should parse")
}

#[tokio::test]
async fn test_buy_signal_is_recorded_delivered_and_flagged() {
    let db = common::setup_test_db().await;
    let telegram = common::spawn_mock_telegram(StatusCode::OK, Duration::ZERO).await;
    let notifier = common::notifier_for(&telegram.base_url, Duration::from_secs(5), 2);

    let outcome = process_payload(
        &db.pool,
        &notifier,
        payload(r#"{"symbol":"TADAWUL:2222","action":"buy","price":35.5}"#),
        fixed_now(),
    )
    .await
    .expect("Pipeline should succeed");

    assert!(outcome.delivered);

    let stored = signal_repo::get_signal(&db.pool, outcome.signal_id)
        .await
        .unwrap()
        .expect("Signal should be stored");
    assert_eq!(stored.action, Action::Buy);
    assert_eq!(stored.price, Decimal::new(355, 1));
    assert!(stored.notified);

    let requests = telegram.requests();
    assert_eq!(requests.len(), 1);
    let body = &requests[0]["body"];
    assert_eq!(requests[0]["bot"], format!("bot{}", common::TEST_BOT_TOKEN));
    assert_eq!(body["chat_id"], common::TEST_CHAT_ID);
    assert_eq!(body["parse_mode"], "HTML");

    let text = body["text"].as_str().unwrap();
    assert!(text.contains("أرامكو السعودية"));
    assert!(text.contains("35.50"));
    assert!(text.contains("36.57"));
    assert!(text.contains("34.79"));
    assert!(text.contains("2025-06-01 10:30:00"));

    let stats = stats_repo::get_stats(&db.pool, "TADAWUL:2222")
        .await
        .unwrap()
        .expect("Stats should be created");
    assert_eq!(stats.total_signals, 1);
}

#[tokio::test]
async fn test_failed_delivery_still_records_signal() {
    let db = common::setup_test_db().await;
    let telegram =
        common::spawn_mock_telegram(StatusCode::INTERNAL_SERVER_ERROR, Duration::ZERO).await;
    let notifier = common::notifier_for(&telegram.base_url, Duration::from_secs(5), 2);

    let outcome = process_payload(
        &db.pool,
        &notifier,
        payload(r#"{"symbol":"TADAWUL:1120","action":"SELL","price":"82.10"}"#),
        fixed_now(),
    )
    .await
    .expect("Delivery failure must not fail ingestion");

    assert!(!outcome.delivered);
    assert_eq!(telegram.requests().len(), 1, "Delivery is attempted once, never retried");

    let stored = signal_repo::get_signal(&db.pool, outcome.signal_id)
        .await
        .unwrap()
        .expect("Signal should be stored");
    assert!(!stored.notified);
    assert_eq!(stored.action, Action::Sell);
}

#[tokio::test]
async fn test_unconfigured_notifier_reports_not_delivered() {
    let db = common::setup_test_db().await;
    let notifier = common::unconfigured_notifier();

    let outcome = ingest(
        &db.pool,
        &notifier,
        br#"{"symbol":"TADAWUL:7010","action":"buy","price":40}"#,
    )
    .await
    .expect("Ingestion should succeed");

    assert!(!outcome.delivered);
    let stored = signal_repo::get_signal(&db.pool, outcome.signal_id).await.unwrap().unwrap();
    assert!(!stored.notified);
}

#[tokio::test]
async fn test_missing_indicators_are_absent_and_price_defaults_to_zero() {
    let db = common::setup_test_db().await;
    let notifier = common::unconfigured_notifier();

    let outcome = ingest(&db.pool, &notifier, br#"{"symbol":"TADAWUL:1211","action":"alert"}"#)
        .await
        .expect("Ingestion should succeed");

    let stored = signal_repo::get_signal(&db.pool, outcome.signal_id).await.unwrap().unwrap();
    assert_eq!(stored.price, Decimal::ZERO);
    assert!(stored.rsi.is_none());
    assert!(stored.macd.is_none());
    assert!(stored.volume.is_none());
    assert_eq!(stored.action, Action::Alert);
}

#[tokio::test]
async fn test_indicators_and_annotations_are_persisted() {
    let db = common::setup_test_db().await;
    let telegram = common::spawn_mock_telegram(StatusCode::OK, Duration::ZERO).await;
    let notifier = common::notifier_for(&telegram.base_url, Duration::from_secs(5), 2);

    let outcome = ingest(
        &db.pool,
        &notifier,
        br#"{"symbol":"TADAWUL:2010","action":"Buy","price":"71.25","rsi":"28.4",
             "macd":0.42,"volume":1500000,"message":"Golden cross",
             "strategy":"EMA 9/21","signals":4}"#,
    )
    .await
    .unwrap();

    let stored = signal_repo::get_signal(&db.pool, outcome.signal_id).await.unwrap().unwrap();
    assert_eq!(stored.rsi, Some(Decimal::new(284, 1)));
    assert_eq!(stored.macd, Some(Decimal::new(42, 2)));
    assert_eq!(stored.volume, Some(Decimal::from(1_500_000)));
    assert_eq!(stored.message.as_deref(), Some("Golden cross"));
    assert_eq!(stored.strategy.as_deref(), Some("EMA 9/21"));
    assert_eq!(stored.signal_count.as_deref(), Some("4"));

    let text = telegram.requests()[0]["body"]["text"].as_str().unwrap().to_string();
    assert!(text.contains("سابك"));
    assert!(text.contains("• RSI: 28.4 (تشبع بيعي)"));
    assert!(text.contains("• MACD: +0.42 (إيجابي)"));
    assert!(text.contains("1,500,000"));
    assert!(text.contains("EMA 9/21"));
    assert!(text.contains("Golden cross"));
}

#[tokio::test]
async fn test_empty_body_is_rejected_without_writes() {
    let db = common::setup_test_db().await;
    let telegram = common::spawn_mock_telegram(StatusCode::OK, Duration::ZERO).await;
    let notifier = common::notifier_for(&telegram.base_url, Duration::from_secs(5), 2);

    let bodies: [&[u8]; 4] = [b"", b"{}", b"null", b"not json at all"];
    for body in bodies {
        let result = ingest(&db.pool, &notifier, body).await;
        assert!(matches!(result, Err(IngestError::Validation(_))));
    }

    assert_eq!(signal_repo::count_signals(&db.pool).await.unwrap(), 0);
    assert!(telegram.requests().is_empty());
}

#[tokio::test]
async fn test_storage_failure_skips_notification() {
    let db = common::setup_test_db().await;
    let telegram = common::spawn_mock_telegram(StatusCode::OK, Duration::ZERO).await;
    let notifier = common::notifier_for(&telegram.base_url, Duration::from_secs(5), 2);

    db.pool.close().await;

    let result = ingest(
        &db.pool,
        &notifier,
        br#"{"symbol":"TADAWUL:2222","action":"buy","price":35.5}"#,
    )
    .await;

    assert!(matches!(result, Err(IngestError::Persistence(_))));
    assert!(telegram.requests().is_empty(), "Nothing is sent for an unrecorded signal");
}

#[tokio::test]
async fn test_signal_without_symbol_skips_stats() {
    let db = common::setup_test_db().await;
    let notifier = common::unconfigured_notifier();

    let outcome = ingest(&db.pool, &notifier, br#"{"action":"buy","price":10}"#)
        .await
        .expect("Ingestion should succeed");

    let stored = signal_repo::get_signal(&db.pool, outcome.signal_id).await.unwrap().unwrap();
    assert_eq!(stored.symbol, "");
    assert!(stats_repo::get_stats(&db.pool, "").await.unwrap().is_none());
}

#[tokio::test]
async fn test_repeated_signals_accumulate_stats() {
    let db = common::setup_test_db().await;
    let notifier = common::unconfigured_notifier();

    for _ in 0..3 {
        ingest(
            &db.pool,
            &notifier,
            br#"{"symbol":"TADAWUL:5110","action":"sell","price":19.8}"#,
        )
        .await
        .unwrap();
    }

    let stats = stats_repo::get_stats(&db.pool, "TADAWUL:5110").await.unwrap().unwrap();
    assert_eq!(stats.total_signals, 3);
}

#[tokio::test]
async fn test_stats_failure_does_not_fail_ingestion() {
    let db = common::setup_test_db().await;
    let telegram = common::spawn_mock_telegram(StatusCode::OK, Duration::ZERO).await;
    let notifier = common::notifier_for(&telegram.base_url, Duration::from_secs(5), 2);

    sqlx::query("DROP TABLE stats")
        .execute(&db.pool)
        .await
        .expect("Dropping stats table should succeed");

    let outcome = ingest(
        &db.pool,
        &notifier,
        br#"{"symbol":"TADAWUL:2222","action":"buy","price":35.5}"#,
    )
    .await
    .expect("A stats failure must not fail ingestion");

    let stored = signal_repo::get_signal(&db.pool, outcome.signal_id)
        .await
        .unwrap()
        .expect("Signal should still be stored");
    assert_eq!(stored.symbol, "TADAWUL:2222");

    assert_eq!(telegram.requests().len(), 1, "Notification is still attempted");
    assert!(outcome.delivered);
    assert!(stored.notified);
}
