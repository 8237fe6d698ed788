use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Who wrote a record: the chat it came from and the sending user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Author {
    pub chat_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

/// A chat message already normalized by the transport adapter.
#[derive(Debug, Clone, Deserialize)]
pub struct InboundMessage {
    pub conversation_id: i64,
    #[serde(default)]
    pub message_id: Option<i64>,
    #[serde(default)]
    pub sender_id: Option<i64>,
    #[serde(default)]
    pub sender_handle: Option<String>,
    #[serde(default)]
    pub sender_first_name: Option<String>,
    /// Message text or image caption.
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub image: Option<serde_bytes::ByteBuf>,
    #[serde(default = "OffsetDateTime::now_utc", with = "time::serde::timestamp")]
    pub timestamp: OffsetDateTime,
}

impl InboundMessage {
    pub fn text(&self) -> &str {
        self.text.as_deref().unwrap_or("")
    }

    pub fn image(&self) -> Option<&[u8]> {
        self.image.as_deref().map(|b| b.as_slice())
    }

    pub fn author(&self) -> Author {
        Author {
            chat_id: self.conversation_id,
            user_id: self.sender_id,
            username: self.sender_handle.clone(),
        }
    }
}

/// Outbound effect: send `text` to `conversation_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reply {
    pub conversation_id: i64,
    pub text: String,
}
