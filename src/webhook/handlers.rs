use axum::{
    extract::{DefaultBodyLimit, State},
    routing::post,
    Json, Router,
};
use tracing::{debug, instrument};

use super::dto::WebhookResponse;
use super::extractors::WebhookAuth;
use crate::bot::{handle_message, message::InboundMessage};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/messages", post(receive_message))
        .layer(DefaultBodyLimit::max(20 * 1024 * 1024)) // 20MB, images
}

#[instrument(skip_all)]
pub async fn receive_message(
    State(state): State<AppState>,
    _auth: WebhookAuth,
    Json(message): Json<InboundMessage>,
) -> Json<WebhookResponse> {
    debug!(
        conversation_id = message.conversation_id,
        has_image = message.image.is_some(),
        "inbound message"
    );
    let replies = handle_message(&state, &message).await;
    Json(WebhookResponse { replies })
}
