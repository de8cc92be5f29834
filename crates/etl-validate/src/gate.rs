//! Fail-fast quality gates.

use std::collections::BTreeMap;

use polars::prelude::{Column, DataFrame};
use tracing::debug;

use etl_common::{column_f64_values, column_text_values, format_numeric};
use etl_model::{QualityError, Result};

const SAMPLE_LIMIT: usize = 5;

/// Fail with a schema error naming every column of `names` absent from `df`.
///
/// `label` names the table in the error message.
pub fn require_columns(df: &DataFrame, names: &[&str], label: &str) -> Result<()> {
    let missing: Vec<String> = names
        .iter()
        .filter(|name| df.column(name).is_err())
        .map(|name| (*name).to_string())
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(QualityError::Schema {
            table: label.to_string(),
            missing,
        })
    }
}

/// Fail when `df` has no rows.
pub fn assert_non_empty(df: &DataFrame, label: &str) -> Result<()> {
    if df.height() == 0 {
        return Err(QualityError::EmptyInput {
            label: label.to_string(),
        });
    }
    Ok(())
}

/// Fail when `key` has a repeated non-null value or any null.
pub fn assert_unique_key(df: &DataFrame, key: &str) -> Result<()> {
    let column = df.column(key).map_err(|_| QualityError::Schema {
        table: format!("unique key '{key}'"),
        missing: vec![key.to_string()],
    })?;

    let values = column_text_values(column);
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    let mut nulls = 0usize;
    for value in &values {
        match value {
            Some(value) => *counts.entry(value.as_str()).or_default() += 1,
            None => nulls += 1,
        }
    }
    let duplicated: Vec<&str> = counts
        .iter()
        .filter(|(_, count)| **count > 1)
        .map(|(value, _)| *value)
        .collect();

    if duplicated.is_empty() && nulls == 0 {
        debug!(key, rows = values.len(), "key is unique");
        return Ok(());
    }
    Err(QualityError::DuplicateKey {
        column: key.to_string(),
        duplicates: duplicated.len(),
        nulls,
        samples: duplicated
            .into_iter()
            .take(SAMPLE_LIMIT)
            .map(str::to_string)
            .collect(),
    })
}

/// Fail when any non-null value of `column` is below `lo` or above `hi`.
///
/// `name` labels the column in the error. Nulls are exempt.
pub fn assert_in_range(column: &Column, lo: f64, hi: Option<f64>, name: &str) -> Result<()> {
    let violations: Vec<f64> = column_f64_values(column)
        .into_iter()
        .flatten()
        .filter(|value| *value < lo || hi.is_some_and(|hi| *value > hi))
        .collect();
    if violations.is_empty() {
        return Ok(());
    }
    Err(QualityError::Range {
        column: name.to_string(),
        lo,
        hi,
        violations: violations.len(),
        samples: violations
            .iter()
            .take(SAMPLE_LIMIT)
            .map(|value| format_numeric(*value))
            .collect(),
    })
}
