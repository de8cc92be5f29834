//! Winsorizing and IQR outlier flags.
//!
//! Percentiles use linear interpolation between closest ranks: for `n`
//! sorted values the percentile `q` sits at position `q * (n - 1)`.

use polars::prelude::{Column, DataFrame};
use tracing::debug;

use etl_common::column_f64_values;
use etl_model::{QualityError, Result, WinsorizeOptions};

/// Percentile of already sorted values.
///
/// `None` when `sorted` is empty or holds a non-finite value.
///
/// # Examples
///
/// ```
/// use etl_transform::quantile;
///
/// let sorted = [1.0, 2.0, 3.0, 4.0];
/// assert_eq!(quantile(&sorted, 0.5), Some(2.5));
/// assert_eq!(quantile(&sorted, 1.0), Some(4.0));
/// assert_eq!(quantile(&[], 0.5), None);
/// assert_eq!(quantile(&[1.0, f64::INFINITY], 0.5), None);
/// ```
pub fn quantile(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.iter().any(|v| !v.is_finite()) {
        return None;
    }
    let last = sorted.len().checked_sub(1)?;
    let position = q.clamp(0.0, 1.0) * last as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let fraction = position - lower as f64;
    Some(sorted[lower] * (1.0 - fraction) + sorted[upper] * fraction)
}

fn sorted_present(values: &[Option<f64>]) -> Vec<f64> {
    let mut present: Vec<f64> = values
        .iter()
        .flatten()
        .copied()
        .filter(|v| v.is_finite())
        .collect();
    present.sort_by(f64::total_cmp);
    present
}

fn require_column<'a>(df: &'a DataFrame, col: &str, stage: &str) -> Result<&'a Column> {
    df.column(col).map_err(|_| QualityError::Schema {
        table: stage.to_string(),
        missing: vec![col.to_string()],
    })
}

/// Lower and upper clamp bounds for `column`, or `None` if it has no values.
pub fn winsor_bounds(column: &Column, lower_pct: f64, upper_pct: f64) -> Result<Option<(f64, f64)>> {
    WinsorizeOptions {
        lower: lower_pct,
        upper: upper_pct,
    }
    .validate()?;
    let sorted = sorted_present(&column_f64_values(column));
    let bounds = quantile(&sorted, lower_pct).zip(quantile(&sorted, upper_pct));
    Ok(bounds.map(|(lo, hi)| (lo.min(hi), lo.max(hi))))
}

/// Clamp every non-null value into the `[lower_pct, upper_pct]` percentile range.
///
/// Nulls stay null and the row count never changes. The result keeps the
/// input column name.
pub fn winsorize(column: &Column, lower_pct: f64, upper_pct: f64) -> Result<Column> {
    let values = column_f64_values(column);
    let clamped: Vec<Option<f64>> = match winsor_bounds(column, lower_pct, upper_pct)? {
        Some((lo, hi)) => values
            .into_iter()
            .map(|value| value.map(|v| v.max(lo).min(hi)))
            .collect(),
        None => values,
    };
    Ok(Column::new(column.name().clone(), clamped))
}

/// Append `<col>_winsor`, the winsorized copy of `col`.
pub fn add_winsor_column(df: &DataFrame, col: &str, options: &WinsorizeOptions) -> Result<DataFrame> {
    let column = require_column(df, col, "winsorize")?;
    let winsorized = winsorize(column, options.lower, options.upper)?;
    let values = column_f64_values(&winsorized);
    let mut out = df.clone();
    out.with_column(Column::new(format!("{col}_winsor").into(), values))?;
    Ok(out)
}

/// The `[Q1 - k*IQR, Q3 + k*IQR]` fence of `column`, or `None` if it has no values.
pub fn iqr_fence(column: &Column, k: f64) -> Result<Option<(f64, f64)>> {
    if !k.is_finite() || k < 0.0 {
        return Err(QualityError::InvalidParameter {
            name: "IQR multiplier".to_string(),
            reason: format!("expected a finite value >= 0, got {k}"),
        });
    }
    let sorted = sorted_present(&column_f64_values(column));
    let fence = quantile(&sorted, 0.25).zip(quantile(&sorted, 0.75)).map(|(q1, q3)| {
        let reach = if k == 0.0 { 0.0 } else { k * (q3 - q1) };
        (q1 - reach, q3 + reach)
    });
    Ok(fence)
}

/// Append `<col>_outlier`: true when the value lies outside the IQR fence.
///
/// Nulls are flagged false.
pub fn add_outlier_flag(df: &DataFrame, col: &str, k: f64) -> Result<DataFrame> {
    let column = require_column(df, col, "add_outlier_flag")?;
    let fence = iqr_fence(column, k)?;
    let values = column_f64_values(column);
    let flags: Vec<bool> = values
        .iter()
        .map(|value| match (value, fence) {
            (Some(v), Some((lo, hi))) => *v < lo || *v > hi,
            _ => false,
        })
        .collect();
    let flagged = flags.iter().filter(|flag| **flag).count();
    debug!(column = col, k, flagged, fence = ?fence, "outlier flags computed");
    let mut out = df.clone();
    out.with_column(Column::new(format!("{col}_outlier").into(), flags))?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn amounts(values: Vec<Option<f64>>) -> Column {
        Column::new("amount".into(), values)
    }

    #[test]
    fn quantile_interpolates_linearly() {
        let sorted: Vec<f64> = (1..=101).map(f64::from).collect();
        assert_eq!(quantile(&sorted, 0.01), Some(2.0));
        assert_eq!(quantile(&sorted, 0.99), Some(100.0));
        assert_eq!(quantile(&[5.0], 0.3), Some(5.0));
        assert_eq!(quantile(&[0.0, 10.0], 0.25), Some(2.5));
    }

    #[test]
    fn winsorize_clamps_extremes_and_keeps_nulls() {
        let column = amounts(vec![Some(1.0), Some(2.0), None, Some(3.0), Some(1000.0)]);
        let winsorized = winsorize(&column, 0.0, 0.75).unwrap();
        let values = winsorized.f64().unwrap();
        assert_eq!(values.get(0), Some(1.0));
        assert_eq!(values.get(2), None);
        assert_eq!(values.get(4), Some(3.0 + (1000.0 - 3.0) * 0.25));
        assert_eq!(winsorized.len(), 5);
    }

    #[test]
    fn winsorize_all_null_is_identity() {
        let column = amounts(vec![None, None]);
        let winsorized = winsorize(&column, 0.01, 0.99).unwrap();
        assert_eq!(winsorized.null_count(), 2);
    }

    #[test]
    fn infinite_values_are_treated_as_missing() {
        let column = amounts(vec![Some(1.0), Some(f64::INFINITY), Some(f64::NEG_INFINITY), Some(2.0)]);
        let winsorized = winsorize(&column, 0.01, 0.99).unwrap();
        let values: Vec<Option<f64>> = winsorized.f64().unwrap().into_iter().collect();
        assert_eq!(values[1], None);
        assert_eq!(values[2], None);
        assert!(values[0].is_some_and(|v| (1.0..=2.0).contains(&v)));
        assert!(values[3].is_some_and(|v| (1.0..=2.0).contains(&v)));

        let only_inf = amounts(vec![Some(f64::INFINITY)]);
        assert_eq!(winsorize(&only_inf, 0.01, 0.99).unwrap().null_count(), 1);
        assert_eq!(iqr_fence(&only_inf, 1.5).unwrap(), None);

        let df = DataFrame::new(vec![column]).unwrap();
        let flagged = add_outlier_flag(&df, "amount", 1.5).unwrap();
        let flags: Vec<Option<bool>> = flagged
            .column("amount_outlier")
            .unwrap()
            .bool()
            .unwrap()
            .into_iter()
            .collect();
        assert_eq!(flags, vec![Some(false); 4]);
    }

    #[test]
    fn extreme_finite_values_do_not_overflow_bounds() {
        let column = amounts(vec![Some(f64::MIN), Some(0.0), Some(f64::MAX)]);
        let (lo, hi) = winsor_bounds(&column, 0.25, 0.75).unwrap().unwrap();
        assert!(lo.is_finite() && hi.is_finite() && lo <= hi);
        assert_eq!(winsorize(&column, 0.25, 0.75).unwrap().null_count(), 0);
        assert!(iqr_fence(&column, 0.0).unwrap().is_some_and(|(lo, hi)| lo <= hi));
    }

    #[test]
    fn single_value_column_is_unchanged() {
        let column = amounts(vec![Some(42.0)]);
        let winsorized = winsorize(&column, 0.01, 0.99).unwrap();
        assert_eq!(winsorized.f64().unwrap().get(0), Some(42.0));
        assert_eq!(iqr_fence(&column, 1.5).unwrap(), Some((42.0, 42.0)));
    }

    #[test]
    fn winsorize_rejects_inverted_percentiles() {
        let column = amounts(vec![Some(1.0)]);
        assert!(winsorize(&column, 0.9, 0.1).is_err());
    }

    #[test]
    fn outlier_flag_uses_iqr_fence() {
        let df = DataFrame::new(vec![amounts(vec![
            Some(10.0),
            Some(12.0),
            Some(11.0),
            Some(13.0),
            None,
            Some(500.0),
        ])])
        .unwrap();
        let flagged = add_outlier_flag(&df, "amount", 1.5).unwrap();
        let flags = flagged.column("amount_outlier").unwrap().bool().unwrap();
        let flags: Vec<Option<bool>> = flags.into_iter().collect();
        assert_eq!(
            flags,
            vec![Some(false), Some(false), Some(false), Some(false), Some(false), Some(true)]
        );
    }

    #[test]
    fn negative_k_is_rejected() {
        let column = amounts(vec![Some(1.0)]);
        assert!(iqr_fence(&column, -1.0).is_err());
        assert!(iqr_fence(&column, f64::NAN).is_err());
    }

    #[test]
    fn add_winsor_column_appends() {
        let df = DataFrame::new(vec![amounts(vec![Some(1.0), Some(2.0)])]).unwrap();
        let out = add_winsor_column(&df, "amount", &WinsorizeOptions::default()).unwrap();
        assert_eq!(out.width(), 2);
        assert!(out.column("amount_winsor").is_ok());
    }
}
