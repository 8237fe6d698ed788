use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::bot::message::Author;

/// Per-100g nutrition values. `None` means the catalog did not report the
/// field, which is different from a reported zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NutritionFacts {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub energy_kcal_100g: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proteins_100g: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub carbohydrates_100g: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fat_100g: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sugars_100g: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fiber_100g: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub salt_100g: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sodium_100g: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmittedItem {
    pub barcode: String,
    pub product_name: String,
    pub nutrition_facts: NutritionFacts,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<String>,
    #[serde(flatten)]
    pub author: Author,
    #[serde(with = "time::serde::rfc3339")]
    pub date: OffsetDateTime,
}

impl SubmittedItem {
    /// Alias as it is matched against queries.
    pub fn alias_key(&self) -> Option<&str> {
        self.alias.as_deref().map(str::trim)
    }
}

/// Opaque handle to a stored item, used to overwrite it in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemRef(pub Uuid);

#[derive(Debug, Clone, PartialEq)]
pub struct StoredItem {
    pub item_ref: ItemRef,
    pub item: SubmittedItem,
}

/// Resolved catalog data waiting for the alias decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingItem {
    pub barcode: String,
    pub product_name: String,
    pub nutrition_facts: NutritionFacts,
    pub brand: Option<String>,
    pub quantity: Option<String>,
}

impl PendingItem {
    pub fn into_item(self, alias: Option<String>, author: Author, date: OffsetDateTime) -> SubmittedItem {
        SubmittedItem {
            barcode: self.barcode,
            product_name: self.product_name,
            nutrition_facts: self.nutrition_facts,
            alias,
            brand: self.brand,
            quantity: self.quantity,
            author,
            date,
        }
    }
}
