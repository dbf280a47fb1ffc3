use std::sync::Arc;

use chrono::Local;

use signal_relay::api::router::create_router;
use signal_relay::config::AppConfig;
use signal_relay::services::formatter::format_startup_message;
use signal_relay::services::notifier::{mask_token, Notifier};
use signal_relay::metrics::init_metrics;
use signal_relay::{db, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env()?;
    init_tracing(config.log_json);

    let addr = format!("{}:{}", config.host, config.port);

    let bot_token = config
        .telegram_bot_token
        .as_deref()
        .map(mask_token)
        .unwrap_or_else(|| "NOT SET".into());
    let chat_id = config.telegram_chat_id.as_deref().unwrap_or("NOT SET");
    let secret = if config.webhook_secret.is_some() { "SET" } else { "NOT SET" };
    tracing::info!(
        telegram_bot_token = %bot_token,
        telegram_chat_id = %chat_id,
        webhook_secret = %secret,
        "Configuration loaded"
    );

    tracing::info!(url = %config.database_url, "Opening database...");
    let db = db::init_pool(&config.database_url, config.database_max_connections).await?;
    tracing::info!("Database ready");

    let metrics_handle = init_metrics()?;

    let notifier = Arc::new(Notifier::from_config(&config)?);
    if config.has_telegram() {
        tracing::info!("Telegram notifications enabled");
        if config.startup_notification {
            let sent = notifier
                .send(&format_startup_message(Local::now().naive_local()))
                .await;
            if !sent {
                tracing::warn!("Startup notification was not delivered");
            }
        }
    } else {
        tracing::warn!("Telegram credentials missing, signals will be recorded but not sent");
    }

    let state = AppState {
        db,
        config,
        metrics_handle,
        notifier,
    };
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {addr}");
    axum::serve(listener, router).await?;

    Ok(())
}

fn init_tracing(json: bool) {
    use tracing_subscriber::{fmt, EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer()).init();
    }
}
