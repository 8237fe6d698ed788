use serde::Deserialize;
use serde_json::{Map, Value};

use super::nutrition::extract_nutrition_facts;
use crate::items::repo_types::NutritionFacts;

/// Fields requested when resolving a product for submission.
pub const PRODUCT_FIELDS: &[&str] = &[
    "code",
    "product_name",
    "product_name_en",
    "generic_name",
    "brands",
    "quantity",
    "nutriments",
];

/// Fields requested by the plain name lookup.
pub const NAME_FIELDS: &[&str] = &[
    "code",
    "product_name",
    "product_name_en",
    "generic_name",
    "brands",
    "quantity",
];

/// Envelope of `GET /api/v2/product/{code}.json`.
#[derive(Debug, Deserialize)]
pub struct ProductResponse {
    #[serde(default)]
    pub status: Option<Value>,
    #[serde(default)]
    pub product: Option<Map<String, Value>>,
}

impl ProductResponse {
    pub fn into_product(self) -> Option<CatalogProduct> {
        if self.status.as_ref().and_then(Value::as_i64) == Some(0) {
            return None;
        }
        self.product.as_ref().map(CatalogProduct::from_record)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatalogProduct {
    pub code: Option<String>,
    pub product_name: Option<String>,
    pub product_name_en: Option<String>,
    pub generic_name: Option<String>,
    pub brands: Option<String>,
    pub quantity: Option<String>,
    pub nutrition_facts: NutritionFacts,
}

impl CatalogProduct {
    /// Tolerant parse of a raw product record; wrong types and blank
    /// strings become `None`.
    pub fn from_record(record: &Map<String, Value>) -> Self {
        Self {
            code: string_field(record, "code"),
            product_name: string_field(record, "product_name"),
            product_name_en: string_field(record, "product_name_en"),
            generic_name: string_field(record, "generic_name"),
            brands: string_field(record, "brands"),
            quantity: string_field(record, "quantity"),
            nutrition_facts: extract_nutrition_facts(record.get("nutriments")),
        }
    }

    pub fn display_name(&self) -> Option<&str> {
        self.product_name
            .as_deref()
            .or(self.product_name_en.as_deref())
            .or(self.generic_name.as_deref())
    }
}

fn string_field(record: &Map<String, Value>, key: &str) -> Option<String> {
    record
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn product(value: Value) -> CatalogProduct {
        CatalogProduct::from_record(value.as_object().unwrap())
    }

    #[test]
    fn display_name_prefers_product_name_then_localized_then_generic() {
        let p = product(json!({
            "product_name": "Peanut Butter",
            "product_name_en": "PB",
            "generic_name": "Spread"
        }));
        assert_eq!(p.display_name(), Some("Peanut Butter"));

        let p = product(json!({ "product_name": "  ", "product_name_en": "PB" }));
        assert_eq!(p.display_name(), Some("PB"));

        let p = product(json!({ "product_name": 12, "generic_name": "Spread" }));
        assert_eq!(p.display_name(), Some("Spread"));

        assert_eq!(product(json!({ "code": "1" })).display_name(), None);
    }

    #[test]
    fn parses_brand_quantity_and_nutriments() {
        let p = product(json!({
            "code": "737628064502",
            "product_name": "Peanut Butter",
            "brands": " Acme ",
            "quantity": "300 g",
            "nutriments": { "proteins_100g": 25 }
        }));
        assert_eq!(p.brands.as_deref(), Some("Acme"));
        assert_eq!(p.quantity.as_deref(), Some("300 g"));
        assert_eq!(p.nutrition_facts.proteins_100g, Some(25.0));
    }

    #[test]
    fn status_zero_means_not_found() {
        let res: ProductResponse = serde_json::from_value(json!({
            "status": 0,
            "status_verbose": "product not found",
            "product": { "product_name": "ghost" }
        }))
        .unwrap();
        assert!(res.into_product().is_none());

        let res: ProductResponse = serde_json::from_value(json!({ "status": 1 })).unwrap();
        assert!(res.into_product().is_none());
    }
}
