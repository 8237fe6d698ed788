use serde_json::{Map, Value};

use crate::items::repo_types::NutritionFacts;

/// Map a catalog `nutriments` object onto the per-100g fields we keep.
///
/// Numbers pass through when finite, numeric strings are parsed, anything
/// else leaves the field absent.
pub fn extract_nutrition_facts(nutriments: Option<&Value>) -> NutritionFacts {
    let Some(map) = nutriments.and_then(Value::as_object) else {
        return NutritionFacts::default();
    };

    NutritionFacts {
        energy_kcal_100g: number_field(map, "energy-kcal_100g"),
        proteins_100g: number_field(map, "proteins_100g"),
        carbohydrates_100g: number_field(map, "carbohydrates_100g"),
        fat_100g: number_field(map, "fat_100g"),
        sugars_100g: number_field(map, "sugars_100g"),
        fiber_100g: number_field(map, "fiber_100g"),
        salt_100g: number_field(map, "salt_100g"),
        sodium_100g: number_field(map, "sodium_100g"),
    }
}

fn number_field(map: &Map<String, Value>, key: &str) -> Option<f64> {
    let parsed = match map.get(key)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|v| v.is_finite())
}
