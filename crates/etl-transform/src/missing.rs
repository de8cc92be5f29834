//! Missingness flag columns.

use polars::prelude::{Column, DataFrame};

use etl_model::{QualityError, Result};

/// Append a `<col>_missing` boolean column for each of `cols`.
pub fn add_missing_flags(df: &DataFrame, cols: &[&str]) -> Result<DataFrame> {
    let mut out = df.clone();
    for &name in cols {
        let column = df.column(name).map_err(|_| QualityError::Schema {
            table: "add_missing_flags".to_string(),
            missing: vec![name.to_string()],
        })?;
        let flags: Vec<bool> = column
            .as_materialized_series()
            .is_null()
            .into_iter()
            .map(|flag| flag.unwrap_or(false))
            .collect();
        out.with_column(Column::new(format!("{name}_missing").into(), flags))?;
    }
    Ok(out)
}
