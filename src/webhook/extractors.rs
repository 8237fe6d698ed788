use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
};

use crate::state::AppState;

pub const WEBHOOK_SECRET_HEADER: &str = "x-webhook-secret";

/// Guards the webhook with the shared secret, when one is configured.
pub struct WebhookAuth;

#[async_trait]
impl FromRequestParts<AppState> for WebhookAuth {
    type Rejection = (StatusCode, String);

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(expected) = state.config.webhook_secret.as_deref() else {
            return Ok(WebhookAuth);
        };

        let provided = parts
            .headers
            .get(WEBHOOK_SECRET_HEADER)
            .and_then(|h| h.to_str().ok())
            .ok_or((StatusCode::UNAUTHORIZED, "missing X-Webhook-Secret header".into()))?;

        if provided != expected {
            return Err((StatusCode::UNAUTHORIZED, "invalid webhook secret".into()));
        }
        Ok(WebhookAuth)
    }
}
