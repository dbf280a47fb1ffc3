use std::collections::HashMap;

use axum::{
    extract::{Query, Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::errors::AppError;
use crate::AppState;

const SECRET_HEADER: &str = "x-webhook-secret";

/// Shared-secret check for the webhook route.
///
/// If `WEBHOOK_SECRET` is set, the request must carry it either in the
/// `X-Webhook-Secret` header or as `?secret=` (alert services that cannot set
/// headers put it in the URL). If unset, the check is disabled.
pub async fn require_webhook_secret(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
    req: Request,
    next: Next,
) -> Response {
    // No secret configured → check disabled
    let Some(expected) = state.config.webhook_secret.as_deref() else {
        return next.run(req).await;
    };

    let provided = req
        .headers()
        .get(SECRET_HEADER)
        .and_then(|v| v.to_str().ok())
        .or_else(|| params.get("secret").map(String::as_str));

    let rejection = match provided {
        Some(secret) if constant_time_eq(secret.as_bytes(), expected.as_bytes()) => None,
        Some(_) => Some("secret mismatch"),
        None => Some("secret missing"),
    };

    match rejection {
        None => next.run(req).await,
        Some(reason) => {
            tracing::warn!(reason, "Webhook rejected");
            AppError::Unauthorized.into_response()
        }
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
