use time::OffsetDateTime;
use tracing::{debug, error, info, instrument};

use super::command::Command;
use super::message::{InboundMessage, Reply};
use super::session::Session;
use crate::images::services::{is_pic_save, pic_save};
use crate::items::{flow as item_flow, handlers as item_handlers};
use crate::journal::services::log_message;
use crate::meals::flow as meal_flow;
use crate::products::handlers::say_name;
use crate::state::AppState;

pub const SESSION_EXPIRED: &str = "Previous session expired after inactivity.";
pub const HANDLING_FAILED: &str = "Something went wrong. Try again.";

/// Handle one inbound message and return the replies to send, in order.
///
/// The conversation's session stays locked until this returns, so messages
/// of one conversation never interleave.
#[instrument(skip_all, fields(conversation_id = message.conversation_id))]
pub async fn handle_message(state: &AppState, message: &InboundMessage) -> Vec<Reply> {
    let mut session = state.sessions.checkout(message.conversation_id).await;
    let now = OffsetDateTime::now_utc();
    let mut texts = Vec::with_capacity(2);

    if session.expire_if_idle(now, state.sessions.idle_timeout()) {
        info!("abandoned flows expired");
        texts.push(SESSION_EXPIRED.to_string());
    }

    match route(state, &mut session, message).await {
        Ok(replies) => texts.extend(replies),
        Err(e) => {
            error!(error = ?e, "message handling failed");
            texts.push(HANDLING_FAILED.to_string());
        }
    }
    session.touch(now);

    texts
        .into_iter()
        .map(|text| Reply {
            conversation_id: message.conversation_id,
            text,
        })
        .collect()
}

async fn route(state: &AppState, session: &mut Session, message: &InboundMessage) -> anyhow::Result<Vec<String>> {
    if is_pic_save(message) {
        debug!("pic_save received");
        return Ok(pic_save(state, message).await);
    }
    respond(state, session, message).await.map(|text| vec![text])
}

async fn respond(state: &AppState, session: &mut Session, message: &InboundMessage) -> anyhow::Result<String> {
    if let Some(command) = Command::parse(message.text()) {
        debug!(command = command.name(), "command received");
        return match command {
            Command::ItemSubmit => Ok(item_flow::begin_submit(&mut session.item)),
            Command::ItemList(range) => item_handlers::list_items(state, range).await,
            Command::ItemDelete(query) => item_handlers::delete_item(state, query).await,
            Command::ItemUpdate(alias) => item_flow::begin_update(state, &mut session.item, alias).await,
            Command::Cancel => Ok(item_flow::cancel(&mut session.item)),
            Command::MealCreate(name) => meal_flow::begin(state, &mut session.meal, name).await,
            Command::SayName(product_id) => say_name(state, message, product_id).await,
        };
    }

    if session.item.is_active() {
        return item_flow::handle_input(state, &mut session.item, message).await;
    }
    if session.meal.is_active() {
        return meal_flow::handle_input(state, &mut session.meal, message).await;
    }
    log_message(state, message).await
}
