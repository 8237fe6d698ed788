use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::bot::message::Author;
use crate::items::repo_types::SubmittedItem;

/// Snapshot of a submitted item taken when it was added to a meal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MealIngredient {
    pub barcode: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    pub product_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<String>,
    pub amount: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proteins_100g: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub energy_kcal_100g: Option<f64>,
}

impl MealIngredient {
    pub fn from_item(item: &SubmittedItem, amount: f64) -> Self {
        Self {
            barcode: item.barcode.clone(),
            alias: item.alias.clone(),
            product_name: item.product_name.clone(),
            quantity: item.quantity.clone(),
            amount,
            proteins_100g: item.nutrition_facts.proteins_100g,
            energy_kcal_100g: item.nutrition_facts.energy_kcal_100g,
        }
    }
}

/// Totals are computed once at save time and stored as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meal {
    pub name: String,
    pub ingredients: Vec<MealIngredient>,
    pub total_protein: f64,
    pub total_calories: f64,
    #[serde(flatten)]
    pub author: Author,
    #[serde(with = "time::serde::rfc3339")]
    pub date: OffsetDateTime,
}

/// Case-insensitive, trimmed form used for meal name uniqueness.
pub fn meal_name_key(name: &str) -> String {
    name.trim().to_lowercase()
}
