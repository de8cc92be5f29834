//! Left join guarded by a declared cardinality contract.

use std::collections::{BTreeMap, BTreeSet};

use polars::prelude::{Column, DataFrame, IdxCa, IdxSize, NewChunkedArray};
use tracing::debug;

use etl_common::column_text_values;
use etl_model::{JoinSide, JoinValidation, QualityError, Result};

const SAMPLE_LIMIT: usize = 5;

fn key_values(df: &DataFrame, on: &str, side: JoinSide) -> Result<Vec<Option<String>>> {
    let column = df.column(on).map_err(|_| QualityError::Schema {
        table: format!("join {side}"),
        missing: vec![on.to_string()],
    })?;
    Ok(column_text_values(column))
}

/// Distinct non-null values that occur more than once, in sorted order.
fn duplicated(keys: &[Option<String>]) -> Vec<String> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for key in keys.iter().flatten() {
        *counts.entry(key.as_str()).or_default() += 1;
    }
    counts
        .into_iter()
        .filter(|(_, count)| *count > 1)
        .map(|(key, _)| key.to_string())
        .collect()
}

fn check_side(
    keys: &[Option<String>],
    on: &str,
    validate: JoinValidation,
    side: JoinSide,
) -> Result<()> {
    let dups = duplicated(keys);
    if dups.is_empty() {
        return Ok(());
    }
    Err(QualityError::JoinCardinality {
        key: on.to_string(),
        validate,
        side,
        duplicates: dups.len(),
        samples: dups.into_iter().take(SAMPLE_LIMIT).collect(),
    })
}

/// Left outer join of `left` and `right` on `on`.
///
/// The cardinality contract is checked before joining. Output rows follow
/// the left row order, unmatched rows get nulls and null keys never match.
/// Non-key columns present on both sides get `suffixes.0` (left) and
/// `suffixes.1` (right) appended.
pub fn safe_left_join(
    left: &DataFrame,
    right: &DataFrame,
    on: &str,
    validate: JoinValidation,
    suffixes: (&str, &str),
) -> Result<DataFrame> {
    let left_keys = key_values(left, on, JoinSide::Left)?;
    let right_keys = key_values(right, on, JoinSide::Right)?;
    if validate.requires_unique_left() {
        check_side(&left_keys, on, validate, JoinSide::Left)?;
    }
    if validate.requires_unique_right() {
        check_side(&right_keys, on, validate, JoinSide::Right)?;
    }

    let mut right_index: BTreeMap<&str, Vec<IdxSize>> = BTreeMap::new();
    for (idx, key) in right_keys.iter().enumerate() {
        if let Some(key) = key.as_deref() {
            right_index.entry(key).or_default().push(idx as IdxSize);
        }
    }

    let mut left_take: Vec<IdxSize> = Vec::with_capacity(left.height());
    let mut right_take: Vec<Option<IdxSize>> = Vec::with_capacity(left.height());
    for (idx, key) in left_keys.iter().enumerate() {
        match key.as_deref().and_then(|k| right_index.get(k)) {
            Some(matches) => {
                for &matched in matches {
                    left_take.push(idx as IdxSize);
                    right_take.push(Some(matched));
                }
            }
            None => {
                left_take.push(idx as IdxSize);
                right_take.push(None);
            }
        }
    }

    let left_names: BTreeSet<String> = left
        .get_column_names()
        .iter()
        .map(|name| name.to_string())
        .collect();
    let right_names: BTreeSet<String> = right
        .get_column_names()
        .iter()
        .filter(|name| name.as_str() != on)
        .map(|name| name.to_string())
        .collect();
    let shared: BTreeSet<String> = left_names.intersection(&right_names).cloned().collect();

    let left_rows = left.take(&IdxCa::from_vec("left".into(), left_take))?;
    let right_rows = right
        .drop(on)?
        .take(&IdxCa::from_iter_options("right".into(), right_take.into_iter()))?;

    let mut output_names: BTreeSet<String> = BTreeSet::new();
    let mut columns: Vec<Column> = Vec::with_capacity(left_rows.width() + right_rows.width());
    for (frame, suffix) in [(&left_rows, suffixes.0), (&right_rows, suffixes.1)] {
        for column in frame.get_columns() {
            let name = column.name().to_string();
            let renamed = if shared.contains(&name) {
                format!("{name}{suffix}")
            } else {
                name
            };
            if !output_names.insert(renamed.clone()) {
                return Err(QualityError::ColumnConflict {
                    table: format!("join on '{on}'"),
                    column: renamed,
                });
            }
            let mut column = column.clone();
            column.rename(renamed.into());
            columns.push(column);
        }
    }

    let joined = DataFrame::new(columns)?;
    let matched = left_keys
        .iter()
        .flatten()
        .filter(|key| right_index.contains_key(key.as_str()))
        .count();
    debug!(
        key = on,
        validate = %validate,
        left_rows = left.height(),
        rows = joined.height(),
        matched_left_rows = matched,
        "left join complete"
    );
    Ok(joined)
}

/// Fail when a join changed the row count of its left input.
pub fn check_row_count(expected: usize, actual: usize) -> Result<()> {
    if expected == actual {
        Ok(())
    } else {
        Err(QualityError::JoinExplosion { expected, actual })
    }
}
