//! Categorical text cleanup and explicit value mapping.

use std::collections::BTreeMap;

use polars::prelude::Column;

use etl_common::column_text_values;

/// Lowercase, trim and collapse internal whitespace runs to a single space.
///
/// # Examples
///
/// ```
/// use etl_transform::normalize_value;
///
/// assert_eq!(normalize_value("  Refund  Pending "), "refund pending");
/// assert_eq!(normalize_value("PAID"), "paid");
/// ```
pub fn normalize_value(raw: &str) -> String {
    let mut normalized = String::with_capacity(raw.len());
    for (idx, part) in raw.split_whitespace().enumerate() {
        if idx > 0 {
            normalized.push(' ');
        }
        normalized.push_str(&part.to_lowercase());
    }
    normalized
}

/// Normalize every value of a text column. Nulls pass through.
pub fn normalize_text(column: &Column) -> Column {
    let values: Vec<Option<String>> = column_text_values(column)
        .into_iter()
        .map(|value| value.map(|v| normalize_value(&v)))
        .collect();
    Column::new(column.name().clone(), values)
}

/// Replace values found as keys in `mapping`.
///
/// Values absent from the mapping are kept as they are, so every input has a
/// defined output and unknown categories stay visible.
pub fn apply_mapping(column: &Column, mapping: &BTreeMap<String, String>) -> Column {
    let values: Vec<Option<String>> = column_text_values(column)
        .into_iter()
        .map(|value| value.map(|v| mapping.get(&v).cloned().unwrap_or(v)))
        .collect();
    Column::new(column.name().clone(), values)
}

/// Count non-null values that have no entry in `mapping`.
pub fn count_unmapped(column: &Column, mapping: &BTreeMap<String, String>) -> usize {
    column_text_values(column)
        .iter()
        .flatten()
        .filter(|value| !mapping.contains_key(value.as_str()))
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_mapping() -> BTreeMap<String, String> {
        BTreeMap::from([
            ("paid".to_string(), "paid".to_string()),
            ("refund".to_string(), "refund".to_string()),
            ("refunded".to_string(), "refund".to_string()),
        ])
    }

    #[test]
    fn normalize_then_map_statuses() {
        let status = Column::new("status".into(), vec!["Paid", " refund ", "REFUNDED"]);
        let mapped = apply_mapping(&normalize_text(&status), &status_mapping());
        let values = mapped.str().unwrap();
        assert_eq!(values.get(0), Some("paid"));
        assert_eq!(values.get(1), Some("refund"));
        assert_eq!(values.get(2), Some("refund"));
        assert_eq!(mapped.name().as_str(), "status");
    }

    #[test]
    fn nulls_pass_through() {
        let status = Column::new("status".into(), vec![None, Some("Paid")]);
        let normalized = normalize_text(&status);
        assert_eq!(normalized.null_count(), 1);
        let mapped = apply_mapping(&normalized, &status_mapping());
        assert_eq!(mapped.null_count(), 1);
    }

    #[test]
    fn unmapped_values_are_kept_and_counted() {
        let status = Column::new("status".into(), vec![Some("pending"), Some("paid"), None]);
        let mapped = apply_mapping(&status, &status_mapping());
        assert_eq!(mapped.str().unwrap().get(0), Some("pending"));
        assert_eq!(count_unmapped(&status, &status_mapping()), 1);
    }

    #[test]
    fn internal_whitespace_collapses() {
        assert_eq!(normalize_value("a \t\n b"), "a b");
        assert_eq!(normalize_value("   "), "");
    }
}
