use lazy_static::lazy_static;
use regex::Regex;

use super::repo_types::SubmittedItem;

pub const DEFAULT_LIST_RANGE: ListRange = ListRange { start: 1, end: 10 };

/// Inclusive, 1-based list positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListRange {
    pub start: usize,
    pub end: usize,
}

impl ListRange {
    pub fn contains(&self, position: usize) -> bool {
        (self.start..=self.end).contains(&position)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidRange;

/// Empty input means "use the default range".
pub fn parse_range(query: &str) -> Result<Option<ListRange>, InvalidRange> {
    lazy_static! {
        static ref RANGE_RE: Regex = Regex::new(r"^([0-9]+)\s*-\s*([0-9]+)$").unwrap();
    }

    let query = query.trim();
    if query.is_empty() {
        return Ok(None);
    }

    let caps = RANGE_RE.captures(query).ok_or(InvalidRange)?;
    let start: usize = caps[1].parse().map_err(|_| InvalidRange)?;
    let end: usize = caps[2].parse().map_err(|_| InvalidRange)?;
    if start < 1 || end < start {
        return Err(InvalidRange);
    }
    Ok(Some(ListRange { start, end }))
}

pub fn format_item_line(position: usize, item: &SubmittedItem) -> String {
    let alias = item.alias.as_deref().unwrap_or("-");
    let protein = optional_number(item.nutrition_facts.proteins_100g);
    let calories = optional_number(item.nutrition_facts.energy_kcal_100g);
    format!(
        "{position}. barcode: {} | name: {} | alias: {alias} | protein: {protein} | calories: {calories}",
        item.barcode, item.product_name
    )
}

fn optional_number(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "-".into())
}

/// Lines for the items at positions inside `range`, in stored order.
pub fn select_lines(items: &[SubmittedItem], range: ListRange) -> Vec<String> {
    items
        .iter()
        .enumerate()
        .map(|(index, item)| (index + 1, item))
        .filter(|(position, _)| range.contains(*position))
        .map(|(position, item)| format_item_line(position, item))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::sample_item;

    #[test]
    fn range_parsing() {
        assert_eq!(parse_range(""), Ok(None));
        assert_eq!(parse_range(" 2-3 "), Ok(Some(ListRange { start: 2, end: 3 })));
        assert_eq!(parse_range("5 - 10"), Ok(Some(ListRange { start: 5, end: 10 })));
        assert_eq!(parse_range("3-3"), Ok(Some(ListRange { start: 3, end: 3 })));
        assert_eq!(parse_range("3-2"), Err(InvalidRange));
        assert_eq!(parse_range("0-2"), Err(InvalidRange));
        assert_eq!(parse_range("a-b"), Err(InvalidRange));
        assert_eq!(parse_range("5"), Err(InvalidRange));
        assert_eq!(parse_range("99999999999999999999999-1"), Err(InvalidRange));
    }

    #[test]
    fn formats_missing_values_as_dash() {
        let mut item = sample_item("1001", "Item One");
        item.nutrition_facts.proteins_100g = Some(20.0);
        item.nutrition_facts.energy_kcal_100g = None;
        assert_eq!(
            format_item_line(1, &item),
            "1. barcode: 1001 | name: Item One | alias: - | protein: 20 | calories: -"
        );

        item.alias = Some("two".into());
        item.nutrition_facts.proteins_100g = Some(2.5);
        assert!(format_item_line(2, &item).contains("alias: two | protein: 2.5"));
    }

    #[test]
    fn selects_positions_in_order() {
        let items: Vec<_> = (1..=4)
            .map(|n| sample_item(&format!("100{n}"), &format!("Item {n}")))
            .collect();
        let lines = select_lines(&items, ListRange { start: 2, end: 3 });
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("2. barcode: 1002"));
        assert!(lines[1].starts_with("3. barcode: 1003"));
    }
}
