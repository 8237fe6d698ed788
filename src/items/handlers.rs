use tracing::{info, instrument};

use super::services::{parse_range, select_lines, DEFAULT_LIST_RANGE};
use crate::state::AppState;

#[instrument(skip(state))]
pub async fn list_items(state: &AppState, args: &str) -> anyhow::Result<String> {
    let Ok(range) = parse_range(args) else {
        return Ok("Invalid range. Use /item_list or /item_list 5-10.".into());
    };

    let items = state.items.list().await?;
    let lines = select_lines(&items, range.unwrap_or(DEFAULT_LIST_RANGE));
    if lines.is_empty() {
        return Ok("No submitted items in that range.".into());
    }
    Ok(lines.join("\n"))
}

#[instrument(skip(state))]
pub async fn delete_item(state: &AppState, query: &str) -> anyhow::Result<String> {
    let query = query.trim();
    if query.is_empty() {
        return Ok("Send barcode or alias. Example: /item_delete greek yogurt".into());
    }

    let Some(deleted) = state.items.delete_by_alias_or_barcode(query).await? else {
        return Ok("Item not found for that alias or barcode.".into());
    };

    info!(barcode = %deleted.barcode, alias = ?deleted.alias, "submitted item deleted");
    Ok(format!(
        "Deleted item: {} | barcode: {} | alias: {}",
        deleted.product_name,
        deleted.barcode,
        deleted.alias.as_deref().unwrap_or("-")
    ))
}
