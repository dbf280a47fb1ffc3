use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Raised when a webhook body carries nothing we can use.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("No data")]
pub struct EmptyPayload;

/// Inbound webhook body as sent by the charting service.
///
/// Alert templates often quote numbers (`"price": "{{close}}"`) and sometimes
/// send placeholders that never got substituted, so numeric fields accept both
/// JSON numbers and numeric strings. Anything else reads as absent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WebhookPayload {
    #[serde(default, deserialize_with = "lenient_text")]
    pub symbol: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub action: Option<String>,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub price: Option<Decimal>,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub rsi: Option<Decimal>,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub macd: Option<Decimal>,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub volume: Option<Decimal>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub message: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub strategy: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub signals: Option<String>,
}

impl WebhookPayload {
    /// Parse a raw request body. The body must be a non-empty JSON object.
    pub fn from_body(body: &[u8]) -> Result<Self, EmptyPayload> {
        let value: Value = serde_json::from_slice(body).map_err(|_| EmptyPayload)?;

        match &value {
            Value::Object(map) if !map.is_empty() => {}
            _ => return Err(EmptyPayload),
        }

        serde_json::from_value(value).map_err(|_| EmptyPayload)
    }
}

fn lenient_decimal<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(decimal_from_value))
}

fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    let text = match value {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => return Ok(None),
    };

    Ok(if text.is_empty() { None } else { Some(text) })
}

fn decimal_from_value(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(n) => parse_decimal(&n.to_string()),
        Value::String(s) => parse_decimal(s.trim()),
        _ => None,
    }
}

fn parse_decimal(s: &str) -> Option<Decimal> {
    if s.is_empty() {
        return None;
    }
    Decimal::from_str(s)
        .or_else(|_| Decimal::from_scientific(s))
        .ok()
}
