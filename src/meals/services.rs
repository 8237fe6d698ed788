use lazy_static::lazy_static;
use regex::Regex;

use super::repo_types::MealIngredient;
use crate::items::repo_types::SubmittedItem;

lazy_static! {
    static ref QUOTED_NAME_RE: Regex = Regex::new(r#"^"(.+)"$"#).unwrap();
    static ref SINGLE_TOKEN_RE: Regex = Regex::new(r"^\S+$").unwrap();
    static ref INGREDIENT_LINE_RE: Regex =
        Regex::new(r"^(.*\S)\s+([+-]?(?:[0-9]+(?:\.[0-9]+)?|\.[0-9]+))$").unwrap();
    static ref DONE_RE: Regex = Regex::new(r"(?i)^done$").unwrap();
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MealTotals {
    pub total_protein: f64,
    pub total_calories: f64,
}

/// Sum of `(amount / 100) * per_100g` over all ingredients; missing
/// per-100g values count as zero.
pub fn aggregate(ingredients: &[MealIngredient]) -> MealTotals {
    ingredients.iter().fold(MealTotals::default(), |acc, i| {
        let scale = i.amount / 100.0;
        MealTotals {
            total_protein: acc.total_protein + scale * i.proteins_100g.unwrap_or(0.0),
            total_calories: acc.total_calories + scale * i.energy_kcal_100g.unwrap_or(0.0),
        }
    })
}

/// Two decimals, or none when the rounded value is whole.
pub fn format_nutrition(value: f64) -> String {
    if !value.is_finite() {
        return "0".into();
    }
    let rounded = (value * 100.0).round() / 100.0;
    if rounded.fract() == 0.0 {
        format!("{}", rounded as i64)
    } else {
        format!("{rounded:.2}")
    }
}

/// Accepts a single token or a double-quoted phrase.
pub fn parse_meal_name(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Some(caps) = QUOTED_NAME_RE.captures(trimmed) {
        let inner = caps.get(1).map(|m| m.as_str().trim()).unwrap_or_default();
        return (!inner.is_empty()).then(|| inner.to_string());
    }

    SINGLE_TOKEN_RE
        .is_match(trimmed)
        .then(|| trimmed.to_string())
}

#[derive(Debug, Clone, PartialEq)]
pub struct IngredientLine {
    pub reference: String,
    pub amount: f64,
}

/// `<barcode or alias> <amount>` with a positive amount.
pub fn parse_ingredient_line(line: &str) -> Option<IngredientLine> {
    let caps = INGREDIENT_LINE_RE.captures(line)?;
    let reference = caps.get(1)?.as_str().trim();
    let amount: f64 = caps.get(2)?.as_str().parse().ok()?;

    if reference.is_empty() || !amount.is_finite() || amount <= 0.0 {
        return None;
    }
    Some(IngredientLine {
        reference: reference.to_string(),
        amount,
    })
}

pub fn is_done(text: &str) -> bool {
    DONE_RE.is_match(text.trim())
}

/// Barcode match wins over alias match.
pub fn resolve_reference<'a>(items: &'a [SubmittedItem], reference: &str) -> Option<&'a SubmittedItem> {
    let reference = reference.trim();
    if reference.is_empty() {
        return None;
    }
    items
        .iter()
        .find(|i| i.barcode == reference)
        .or_else(|| items.iter().find(|i| i.alias_key() == Some(reference)))
}
