//! Cell readers over Polars columns.
//!
//! Stages work on plain `Vec<Option<_>>` views of a column so the same code
//! handles raw string columns and already-typed ones.

use polars::prelude::{AnyValue, Column};

/// Renders one cell as text; `Null` becomes an empty string.
///
/// Floats drop trailing zeros so `10.0` and `10` render the same.
///
/// ```
/// use polars::prelude::AnyValue;
/// use etl_common::any_to_string;
///
/// assert_eq!(any_to_string(AnyValue::Null), "");
/// assert_eq!(any_to_string(AnyValue::Float64(10.0)), "10");
/// assert_eq!(any_to_string(AnyValue::String("u1")), "u1");
/// ```
pub fn any_to_string(value: AnyValue<'_>) -> String {
    match value {
        AnyValue::Null => String::new(),
        AnyValue::Float32(v) => format_numeric(f64::from(v)),
        AnyValue::Float64(v) => format_numeric(v),
        AnyValue::String(s) => s.to_string(),
        AnyValue::StringOwned(s) => s.to_string(),
        other => other.to_string(),
    }
}

/// Shortest decimal rendering of `v` without a trailing `.0`.
///
/// ```
/// use etl_common::format_numeric;
///
/// assert_eq!(format_numeric(-5.0), "-5");
/// assert_eq!(format_numeric(2.50), "2.5");
/// assert_eq!(format_numeric(-0.0), "0");
/// ```
pub fn format_numeric(v: f64) -> String {
    if v == 0.0 {
        return "0".to_string();
    }
    let rendered = format!("{v}");
    match rendered.strip_suffix(".0") {
        Some(whole) => whole.to_string(),
        None => rendered,
    }
}

fn any_to_f64(value: AnyValue<'_>) -> Option<f64> {
    let parsed = match value {
        AnyValue::Int8(v) => Some(f64::from(v)),
        AnyValue::Int16(v) => Some(f64::from(v)),
        AnyValue::Int32(v) => Some(f64::from(v)),
        AnyValue::Int64(v) => Some(v as f64),
        AnyValue::UInt8(v) => Some(f64::from(v)),
        AnyValue::UInt16(v) => Some(f64::from(v)),
        AnyValue::UInt32(v) => Some(f64::from(v)),
        AnyValue::UInt64(v) => Some(v as f64),
        AnyValue::Float32(v) => Some(f64::from(v)),
        AnyValue::Float64(v) => Some(v),
        AnyValue::String(s) => s.trim().parse().ok(),
        AnyValue::StringOwned(s) => s.trim().parse().ok(),
        _ => None,
    };
    parsed.filter(|v: &f64| v.is_finite())
}

/// Reads every cell of a column as text. Nulls stay `None`.
pub fn column_text_values(column: &Column) -> Vec<Option<String>> {
    (0..column.len())
        .map(|idx| match column.get(idx).unwrap_or(AnyValue::Null) {
            AnyValue::Null => None,
            value => Some(any_to_string(value)),
        })
        .collect()
}

/// Reads every cell of a column as `f64`.
///
/// Nulls, non-finite values (`NaN`, `inf`, overflowing literals) and text that
/// does not parse as a number are `None`.
pub fn column_f64_values(column: &Column) -> Vec<Option<f64>> {
    (0..column.len())
        .map(|idx| any_to_f64(column.get(idx).unwrap_or(AnyValue::Null)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integers_and_booleans_render_plainly() {
        assert_eq!(any_to_string(AnyValue::Int64(-100)), "-100");
        assert_eq!(any_to_string(AnyValue::UInt32(0)), "0");
        assert_eq!(any_to_string(AnyValue::Boolean(true)), "true");
    }

    #[test]
    fn numeric_text_keeps_significant_digits() {
        assert_eq!(format_numeric(1001.0), "1001");
        assert_eq!(format_numeric(0.125), "0.125");
        assert_eq!(format_numeric(1e21), "1000000000000000000000");
    }

    #[test]
    fn text_and_numeric_views() {
        let column = Column::new("amount".into(), vec![Some(" 1.5 "), None, Some("x"), Some("NaN")]);
        assert_eq!(
            column_text_values(&column),
            vec![
                Some(" 1.5 ".to_string()),
                None,
                Some("x".to_string()),
                Some("NaN".to_string())
            ]
        );
        assert_eq!(column_f64_values(&column), vec![Some(1.5), None, None, None]);
    }

    #[test]
    fn non_finite_spellings_read_as_null() {
        let column = Column::new(
            "amount".into(),
            vec!["inf", "-inf", "infinity", "-Infinity", "1e309", "12"],
        );
        assert_eq!(
            column_f64_values(&column),
            vec![None, None, None, None, None, Some(12.0)]
        );
        let typed = Column::new(
            "amount".into(),
            vec![Some(f64::INFINITY), Some(f64::NEG_INFINITY), Some(f64::NAN), Some(1.5)],
        );
        assert_eq!(column_f64_values(&typed), vec![None, None, None, Some(1.5)]);
    }

    #[test]
    fn typed_columns_read_as_f64() {
        let column = Column::new("quantity".into(), vec![Some(2i64), None]);
        assert_eq!(column_f64_values(&column), vec![Some(2.0), None]);
    }
}
