use serde::Serialize;

use crate::bot::message::Reply;

#[derive(Debug, Serialize)]
pub struct WebhookResponse {
    pub replies: Vec<Reply>,
}
