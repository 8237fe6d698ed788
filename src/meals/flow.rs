use time::OffsetDateTime;
use tracing::{error, info, instrument, warn};

use super::repo_types::{Meal, MealIngredient};
use super::services::{aggregate, format_nutrition, is_done, parse_ingredient_line, parse_meal_name, resolve_reference};
use crate::bot::message::InboundMessage;
use crate::bot::session::{MealFlow, MealState};
use crate::state::AppState;

const INVALID_NAME: &str =
    "Invalid meal name. Use /meal_create <name> or /meal_create \"name with spaces\".";
const NAME_TAKEN: &str = "Meal name already exists.";
pub const MEAL_STARTED: &str =
    "Meal creation started. Send ingredient lines as \"<barcode or alias> <amount>\". Send \"done\" when finished.";
const EXPIRED: &str = "Meal session expired. Start again with /meal_create.";
const EMPTY_INPUT: &str = "Send ingredient entries or send done.";
const NO_INGREDIENTS: &str = "No valid ingredients yet. Add at least one ingredient before done.";
const NO_ENTRIES: &str = "No valid entries found.";
const SAVE_FAILED: &str = "Could not save this meal right now. Send done again.";

#[instrument(skip(state, flow))]
pub async fn begin(state: &AppState, flow: &mut MealFlow, args: &str) -> anyhow::Result<String> {
    let Some(name) = parse_meal_name(args) else {
        return Ok(INVALID_NAME.into());
    };

    if state.meals.find_by_name(&name).await?.is_some() {
        info!(%name, "meal name taken");
        return Ok(NAME_TAKEN.into());
    }

    *flow = MealFlow::collecting(name);
    Ok(MEAL_STARTED.into())
}

#[instrument(skip_all, fields(meal = ?flow.name))]
pub async fn handle_input(
    state: &AppState,
    flow: &mut MealFlow,
    message: &InboundMessage,
) -> anyhow::Result<String> {
    anyhow::ensure!(flow.state == MealState::Collecting, "meal flow is not active");

    let Some(name) = flow.name.clone() else {
        warn!("collecting without a meal name; resetting");
        flow.reset();
        return Ok(EXPIRED.into());
    };

    let text = message.text().trim();
    if text.is_empty() {
        return Ok(EMPTY_INPUT.into());
    }

    if is_done(text) {
        return Ok(finish(state, flow, name, message).await);
    }

    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();

    let items = state.items.list().await?;
    let mut errors = Vec::new();
    let mut accepted = 0usize;

    for line in lines {
        let Some(parsed) = parse_ingredient_line(line) else {
            errors.push(format!("Invalid entry: {line}"));
            continue;
        };
        let Some(item) = resolve_reference(&items, &parsed.reference) else {
            errors.push(format!("Item not found: {}", parsed.reference));
            continue;
        };

        flow.upsert(MealIngredient::from_item(item, parsed.amount));
        accepted += 1;
    }

    let mut reply = Vec::with_capacity(errors.len() + 1);
    if accepted > 0 {
        let noun = if accepted == 1 { "entry" } else { "entries" };
        reply.push(format!("Accepted {accepted} {noun}."));
    }
    reply.extend(errors);
    if reply.is_empty() {
        reply.push(NO_ENTRIES.into());
    }
    Ok(reply.join("\n"))
}

async fn finish(state: &AppState, flow: &mut MealFlow, name: String, message: &InboundMessage) -> String {
    if flow.ingredients.is_empty() {
        return NO_INGREDIENTS.into();
    }

    let totals = aggregate(&flow.ingredients);
    let meal = Meal {
        name,
        ingredients: flow.ingredients.clone(),
        total_protein: totals.total_protein,
        total_calories: totals.total_calories,
        author: message.author(),
        date: OffsetDateTime::now_utc(),
    };

    if let Err(e) = state.meals.save(&meal).await {
        error!(error = %e, meal = %meal.name, "saving meal failed");
        return match state.meals.find_by_name(&meal.name).await {
            Ok(Some(_)) => {
                info!(meal = %meal.name, "meal name taken while collecting");
                flow.reset();
                NAME_TAKEN.into()
            }
            _ => SAVE_FAILED.into(),
        };
    }

    info!(meal = %meal.name, ingredients = meal.ingredients.len(), "meal saved");
    flow.reset();

    format!(
        "Saved meal {}. protein: {} | calories: {}",
        meal.name,
        format_nutrition(meal.total_protein),
        format_nutrition(meal.total_calories)
    )
}
