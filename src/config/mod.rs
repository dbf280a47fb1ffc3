use std::env;

const DEFAULT_DATABASE_URL: &str = "sqlite://trading_bot.db";
const DEFAULT_TELEGRAM_API_BASE: &str = "https://api.telegram.org";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub database_max_connections: u32,
    pub host: String,
    pub port: u16,

    // Telegram (optional, notifications are skipped when either is missing)
    pub telegram_bot_token: Option<String>,
    pub telegram_chat_id: Option<String>,
    pub telegram_api_base: String,
    pub notifier_timeout_secs: u64,
    pub notifier_max_in_flight: usize,
    pub startup_notification: bool,

    /// Shared secret required on POST /webhook when set.
    pub webhook_secret: Option<String>,

    /// Emit JSON log lines instead of the human format.
    pub log_json: bool,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            database_url: non_empty_var("DATABASE_URL")
                .map(|url| normalize_database_url(&url))
                .unwrap_or_else(|| DEFAULT_DATABASE_URL.into()),
            database_max_connections: env::var("DATABASE_MAX_CONNECTIONS")
                .unwrap_or_else(|_| "5".into())
                .parse()?,
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "5000".into())
                .parse()?,

            telegram_bot_token: non_empty_var("TELEGRAM_BOT_TOKEN"),
            telegram_chat_id: non_empty_var("TELEGRAM_CHAT_ID"),
            telegram_api_base: env::var("TELEGRAM_API_BASE")
                .unwrap_or_else(|_| DEFAULT_TELEGRAM_API_BASE.into()),
            notifier_timeout_secs: env::var("NOTIFIER_TIMEOUT_SECS")
                .unwrap_or_else(|_| "10".into())
                .parse()?,
            notifier_max_in_flight: env::var("NOTIFIER_MAX_IN_FLIGHT")
                .unwrap_or_else(|_| "8".into())
                .parse()?,
            startup_notification: env::var("STARTUP_NOTIFICATION")
                .unwrap_or_else(|_| "true".into())
                .parse()
                .unwrap_or(true),

            webhook_secret: non_empty_var("WEBHOOK_SECRET"),

            log_json: env::var("LOG_FORMAT")
                .map(|v| v.eq_ignore_ascii_case("json"))
                .unwrap_or(false),
        })
    }

    /// Returns true if both Telegram credentials are configured.
    pub fn has_telegram(&self) -> bool {
        self.telegram_bot_token.is_some() && self.telegram_chat_id.is_some()
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Map a `DATABASE_URL` onto the form sqlx expects.
///
/// `sqlite:///trading_bot.db` is read as the relative file `trading_bot.db`
/// (three slashes, then a relative path), and `sqlite:////var/db/x.db` as an
/// absolute path. A bare file path gets the `sqlite://` scheme. Anything else
/// is passed through.
pub fn normalize_database_url(url: &str) -> String {
    if let Some(path) = url.strip_prefix("sqlite:///") {
        format!("sqlite://{path}")
    } else if url.contains("://") || url.starts_with("sqlite:") {
        url.to_string()
    } else {
        format!("sqlite://{url}")
    }
}
