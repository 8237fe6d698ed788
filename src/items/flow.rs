use lazy_static::lazy_static;
use regex::Regex;
use time::OffsetDateTime;
use tracing::{error, info, instrument, warn};

use super::repo_types::PendingItem;
use crate::barcode;
use crate::bot::message::InboundMessage;
use crate::bot::session::{ItemFlow, ItemMode, ItemState};
use crate::catalog::dto::PRODUCT_FIELDS;
use crate::state::AppState;

pub const SUBMIT_STARTED: &str =
    "Submit started. Send a barcode image or a text that includes the barcode.";
const NOTHING_TO_CANCEL: &str = "No active submit flow.";
const CANCELLED: &str = "Submit flow cancelled.";
const UNREADABLE: &str = "Could not read a barcode. Send a clearer image or a text with digits.";
const IMAGE_FAILED: &str = "Could not process this image right now. Try again.";
const NOT_FOUND: &str = "Product not found for this barcode. Send another barcode.";
const LOOKUP_FAILED: &str = "Could not fetch this product right now. Try again.";
const EXPIRED: &str = "Submit session expired. Send /item_submit to start again.";
const ALIAS_PROMPT: &str = "Send alias text, or send \"skip\".";
const SAVE_FAILED: &str = "Could not save this item right now. Send the alias again.";
const UPDATE_TARGET_GONE: &str = "Item to update no longer exists. Send /item_update to start again.";

pub fn begin_submit(flow: &mut ItemFlow) -> String {
    *flow = ItemFlow::awaiting_input(ItemMode::Create);
    SUBMIT_STARTED.into()
}

/// Starts an update of the item carrying `alias`. An unknown alias leaves
/// the flow untouched.
#[instrument(skip(state, flow))]
pub async fn begin_update(state: &AppState, flow: &mut ItemFlow, alias: &str) -> anyhow::Result<String> {
    let alias = alias.trim();
    if alias.is_empty() {
        return Ok("Send alias to update. Example: /item_update greek yogurt".into());
    }

    let Some(existing) = state.items.find_by_alias(alias).await? else {
        info!(%alias, "update target not found");
        return Ok("Alias not found.".into());
    };

    *flow = ItemFlow::awaiting_input(ItemMode::Update(existing.item_ref));
    Ok(format!(
        "Updating {} ({}). Send a barcode image or text barcode.",
        existing.item.product_name, existing.item.barcode
    ))
}

pub fn cancel(flow: &mut ItemFlow) -> String {
    if !flow.is_active() {
        return NOTHING_TO_CANCEL.into();
    }
    flow.reset();
    CANCELLED.into()
}

#[instrument(skip_all, fields(state = ?flow.state))]
pub async fn handle_input(
    state: &AppState,
    flow: &mut ItemFlow,
    message: &InboundMessage,
) -> anyhow::Result<String> {
    match flow.state {
        ItemState::Idle => anyhow::bail!("item flow is not active"),
        ItemState::AwaitingInput => Ok(on_awaiting_input(state, flow, message).await),
        ItemState::AwaitingAlias => Ok(on_awaiting_alias(state, flow, message).await),
    }
}

async fn on_awaiting_input(state: &AppState, flow: &mut ItemFlow, message: &InboundMessage) -> String {
    let barcode = match barcode::resolve(state.decoder.as_ref(), message).await {
        Ok(Some(code)) => code,
        Ok(None) => return UNREADABLE.into(),
        Err(e) => {
            error!(error = %e, "barcode image decode failed");
            return IMAGE_FAILED.into();
        }
    };

    let product = match state.catalog.get_product(&barcode, PRODUCT_FIELDS).await {
        Ok(product) => product,
        Err(e) => {
            error!(error = %e, %barcode, status = ?e.status(), "submit lookup failed");
            return LOOKUP_FAILED.into();
        }
    };

    let Some((product, product_name)) = product.and_then(|p| {
        let name = p.display_name()?.to_string();
        Some((p, name))
    }) else {
        info!(%barcode, "no catalog product with a display name");
        return NOT_FOUND.into();
    };

    flow.state = ItemState::AwaitingAlias;
    flow.pending = Some(PendingItem {
        barcode,
        product_name: product_name.clone(),
        nutrition_facts: product.nutrition_facts,
        brand: product.brands,
        quantity: product.quantity,
    });

    format!("Found: {product_name}. Send alias text or send \"skip\" to continue without alias.")
}

async fn on_awaiting_alias(state: &AppState, flow: &mut ItemFlow, message: &InboundMessage) -> String {
    lazy_static! {
        static ref SKIP_ALIAS_RE: Regex = Regex::new(r"(?i)^skip$").unwrap();
    }

    let Some(pending) = flow.pending.clone() else {
        warn!("awaiting alias without a pending item; resetting");
        flow.reset();
        return EXPIRED.into();
    };

    let input = message.text().trim();
    if input.is_empty() {
        return ALIAS_PROMPT.into();
    }
    let alias = (!SKIP_ALIAS_RE.is_match(input)).then(|| input.to_string());

    let product_name = pending.product_name.clone();
    let item = pending.into_item(alias.clone(), message.author(), OffsetDateTime::now_utc());
    let written = match flow.mode {
        ItemMode::Update(item_ref) => state.items.replace_at(item_ref, &item).await,
        ItemMode::Create => state.items.save(&item).await.map(|()| true),
    };
    match written {
        Ok(true) => {}
        Ok(false) => {
            info!(mode = ?flow.mode, "update target deleted mid-flow");
            flow.reset();
            return UPDATE_TARGET_GONE.into();
        }
        Err(e) => {
            error!(error = %e, barcode = %item.barcode, mode = ?flow.mode, "saving submitted item failed");
            return SAVE_FAILED.into();
        }
    }

    info!(barcode = %item.barcode, alias = ?item.alias, mode = ?flow.mode, "submitted item saved");
    flow.reset();

    match alias {
        Some(alias) => format!("Saved {product_name} with alias: {alias}"),
        None => format!("Saved {product_name} without alias."),
    }
}
