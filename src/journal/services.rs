use tracing::{debug, instrument};

use super::repo::LoggedMessage;
use crate::bot::message::InboundMessage;
use crate::state::AppState;

pub const LOGGED: &str = "Logged.";

impl From<&InboundMessage> for LoggedMessage {
    fn from(message: &InboundMessage) -> Self {
        Self {
            id: message.message_id,
            chat_id: message.conversation_id,
            user_id: message.sender_id,
            username: message.sender_handle.clone(),
            first_name: message.sender_first_name.clone(),
            text: message.text.clone(),
            date: message.timestamp,
        }
    }
}

/// Persist a message no flow or command consumed.
#[instrument(skip_all, fields(conversation_id = message.conversation_id))]
pub async fn log_message(state: &AppState, message: &InboundMessage) -> anyhow::Result<String> {
    state.journal.log_message(&LoggedMessage::from(message)).await?;
    debug!(message_id = ?message.message_id, "message logged");
    Ok(LOGGED.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{image_message, text_message, FakeCatalog, FakeDecoder, CHAT_ID};
    use std::sync::Arc;

    #[tokio::test]
    async fn logs_sender_and_text() {
        let (state, store) = AppState::fake(
            Arc::new(FakeCatalog::default()),
            Arc::new(FakeDecoder::returning(None)),
        );

        let reply = log_message(&state, &text_message(CHAT_ID, "hello")).await.unwrap();
        assert_eq!(reply, LOGGED);
        log_message(&state, &image_message(CHAT_ID, vec![1, 2, 3])).await.unwrap();

        let logged = store.messages().await;
        assert_eq!(logged.len(), 2);
        assert_eq!(logged[0].id, Some(10));
        assert_eq!(logged[0].username.as_deref(), Some("allowed_user"));
        assert_eq!(logged[0].first_name.as_deref(), Some("Test"));
        assert_eq!(logged[0].text.as_deref(), Some("hello"));
        assert_eq!(logged[1].text, None);
    }
}
