use std::collections::BTreeMap;

use polars::prelude::{BooleanChunked, DataFrame, NewChunkedArray};
use tracing::debug;

use etl_common::column_text_values;
use etl_model::{QualityError, Result};

use crate::datetime::timestamp_millis;

/// Keep one row per `key`: the one with the latest `ts_col`.
///
/// Null timestamps rank below any parsed timestamp, and ties go to the row
/// that appears last. Rows with a null key are all kept so the uniqueness
/// gate can report them. Surviving rows keep their original relative order.
pub fn dedupe_keep_latest(df: &DataFrame, key: &str, ts_col: &str) -> Result<DataFrame> {
    let missing: Vec<String> = [key, ts_col]
        .into_iter()
        .filter(|name| df.column(name).is_err())
        .map(str::to_string)
        .collect();
    if !missing.is_empty() {
        return Err(QualityError::Schema {
            table: "dedupe_keep_latest".to_string(),
            missing,
        });
    }

    let keys = column_text_values(df.column(key)?);
    let stamps = timestamp_millis(df.column(ts_col)?)?;

    let mut latest: BTreeMap<&str, (usize, Option<i64>)> = BTreeMap::new();
    for (idx, (value, stamp)) in keys.iter().zip(&stamps).enumerate() {
        let Some(value) = value.as_deref() else {
            continue;
        };
        if latest.get(value).is_none_or(|(_, best)| stamp >= best) {
            latest.insert(value, (idx, *stamp));
        }
    }

    let mut keep = vec![false; df.height()];
    for (idx, value) in keys.iter().enumerate() {
        if value.is_none() {
            keep[idx] = true;
        }
    }
    for (idx, _) in latest.values() {
        keep[*idx] = true;
    }

    let mask = BooleanChunked::from_slice("dedupe".into(), &keep);
    let deduped = df.filter(&mask)?;
    debug!(
        key,
        removed = df.height() - deduped.height(),
        "dedupe kept latest row per key"
    );
    Ok(deduped)
}
