use std::sync::Arc;
use std::time::Duration;

use metrics::counter;
use serde_json::json;
use tokio::sync::Semaphore;

use crate::config::AppConfig;

/// Bot token and destination chat.
#[derive(Clone)]
pub struct TelegramCredentials {
    pub bot_token: String,
    pub chat_id: String,
}

impl std::fmt::Debug for TelegramCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramCredentials")
            .field("bot_token", &mask_token(&self.bot_token))
            .field("chat_id", &self.chat_id)
            .finish()
    }
}

/// Telegram notification service.
///
/// `send` never fails: transport and API errors are logged and reported as
/// `false`. Each call is bounded by `timeout`, which also covers waiting for
/// one of the in-flight permits.
#[derive(Debug, Clone)]
pub struct Notifier {
    http: reqwest::Client,
    api_base: String,
    credentials: Option<TelegramCredentials>,
    timeout: Duration,
    in_flight: Arc<Semaphore>,
}

impl Notifier {
    pub fn new(
        api_base: impl Into<String>,
        credentials: Option<TelegramCredentials>,
        timeout: Duration,
        max_in_flight: usize,
    ) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            http,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            credentials,
            timeout,
            in_flight: Arc::new(Semaphore::new(max_in_flight.max(1))),
        })
    }

    pub fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        let credentials = match (&config.telegram_bot_token, &config.telegram_chat_id) {
            (Some(bot_token), Some(chat_id)) => Some(TelegramCredentials {
                bot_token: bot_token.clone(),
                chat_id: chat_id.clone(),
            }),
            _ => None,
        };

        Self::new(
            config.telegram_api_base.clone(),
            credentials,
            Duration::from_secs(config.notifier_timeout_secs),
            config.notifier_max_in_flight,
        )
    }

    /// True when both bot token and chat id are present.
    pub fn is_configured(&self) -> bool {
        self.credentials.is_some()
    }

    /// Send an HTML-formatted message. Returns whether Telegram accepted it.
    pub async fn send(&self, message: &str) -> bool {
        let Some(creds) = &self.credentials else {
            tracing::warn!("Telegram not configured, skipping notification");
            return false;
        };

        let delivered = match tokio::time::timeout(self.timeout, self.deliver(creds, message)).await
        {
            Ok(delivered) => delivered,
            Err(_) => {
                tracing::warn!(
                    timeout_secs = self.timeout.as_secs_f64(),
                    "Telegram notification timed out"
                );
                false
            }
        };

        if delivered {
            counter!("notifications_sent_total").increment(1);
        } else {
            counter!("notifications_failed_total").increment(1);
        }

        delivered
    }

    async fn deliver(&self, creds: &TelegramCredentials, message: &str) -> bool {
        let Ok(_permit) = self.in_flight.acquire().await else {
            return false;
        };

        let url = format!("{}/bot{}/sendMessage", self.api_base, creds.bot_token);

        let body = json!({
            "chat_id": creds.chat_id,
            "text": message,
            "parse_mode": "HTML",
        });

        match self.http.post(&url).json(&body).send().await {
            Ok(resp) if resp.status() == reqwest::StatusCode::OK => {
                tracing::info!("Telegram notification delivered");
                true
            }
            Ok(resp) => {
                tracing::error!(
                    status = %resp.status(),
                    "Telegram sendMessage returned non-200"
                );
                false
            }
            Err(e) => {
                // reqwest includes the URL (and so the token) in its Display output
                tracing::error!(
                    error = %e.without_url(),
                    "Failed to send Telegram notification"
                );
                false
            }
        }
    }
}

/// Show only the tail of a secret: `**********abcd`.
pub fn mask_token(token: &str) -> String {
    let tail: String = token
        .chars()
        .rev()
        .take(4)
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    format!("**********{tail}")
}
