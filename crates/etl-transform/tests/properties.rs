//! Property-based tests for the transform stages.

use polars::prelude::{Column, DataFrame};
use proptest::prelude::*;

use etl_common::{column_f64_values, column_text_values};
use etl_model::JoinValidation;
use etl_transform::{
    add_missing_flags, add_outlier_flag, dedupe_keep_latest, iqr_fence, normalize_value,
    safe_left_join, winsor_bounds, winsorize,
};

// ============================================================================
// Strategies
// ============================================================================

/// Mostly ordinary amounts, with the occasional non-finite or extreme value.
fn amount_values() -> impl Strategy<Value = Vec<Option<f64>>> {
    let amount = prop_oneof![
        8 => -1_000.0f64..100_000.0,
        1 => prop::sample::select(vec![
            f64::INFINITY,
            f64::NEG_INFINITY,
            f64::NAN,
            f64::MAX,
            f64::MIN,
        ]),
    ];
    prop::collection::vec(prop::option::weighted(0.8, amount), 0..60)
}

/// Values the stages read as present; non-finite input counts as missing.
fn present(value: &Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

fn key_values(max_len: usize) -> impl Strategy<Value = Vec<Option<String>>> {
    prop::collection::vec(prop::option::weighted(0.9, "u[0-9]{1,2}"), 0..max_len)
}

fn percentiles() -> impl Strategy<Value = (f64, f64)> {
    (0.0f64..=1.0, 0.0f64..=1.0).prop_map(|(a, b)| if a <= b { (a, b) } else { (b, a) })
}

fn orders_frame(keys: Vec<Option<String>>) -> DataFrame {
    let order_ids: Vec<String> = (0..keys.len()).map(|idx| format!("o{idx}")).collect();
    DataFrame::new(vec![
        Column::new("order_id".into(), order_ids),
        Column::new("user_id".into(), keys),
    ])
    .unwrap()
}

fn unique_users(keys: Vec<String>) -> DataFrame {
    let mut keys = keys;
    keys.sort();
    keys.dedup();
    let countries: Vec<String> = keys.iter().map(|key| format!("c-{key}")).collect();
    DataFrame::new(vec![
        Column::new("user_id".into(), keys),
        Column::new("country".into(), countries),
    ])
    .unwrap()
}

// ============================================================================
// Join
// ============================================================================

proptest! {
    /// A many-to-one join against a unique right key never changes the row count.
    #[test]
    fn many_to_one_join_preserves_left_rows(
        left_keys in key_values(40),
        right_keys in prop::collection::vec("u[0-9]{1,2}", 0..30),
    ) {
        let left = orders_frame(left_keys.clone());
        let right = unique_users(right_keys);
        let joined = safe_left_join(&left, &right, "user_id", JoinValidation::ManyToOne, ("", "_user"))
            .unwrap();

        prop_assert_eq!(joined.height(), left.height());
        prop_assert_eq!(column_text_values(joined.column("user_id").unwrap()), left_keys);
        let order_ids = column_text_values(joined.column("order_id").unwrap());
        let expected: Vec<Option<String>> = (0..left.height()).map(|idx| Some(format!("o{idx}"))).collect();
        prop_assert_eq!(order_ids, expected);
    }

    /// Every matched row carries the right-side attributes of its key.
    #[test]
    fn matched_rows_carry_right_attributes(
        left_keys in key_values(30),
        right_keys in prop::collection::vec("u[0-9]{1,2}", 0..30),
    ) {
        let left = orders_frame(left_keys);
        let right = unique_users(right_keys);
        let joined = safe_left_join(&left, &right, "user_id", JoinValidation::ManyToOne, ("", "_user"))
            .unwrap();
        let keys = column_text_values(joined.column("user_id").unwrap());
        let countries = column_text_values(joined.column("country").unwrap());
        for (key, country) in keys.iter().zip(&countries) {
            if let Some(country) = country {
                let key = key.as_deref().unwrap_or_default();
                prop_assert_eq!(country, &format!("c-{key}"));
            }
        }
    }
}

// ============================================================================
// Outliers
// ============================================================================

proptest! {
    /// Winsorized values stay inside the percentile bounds; nulls stay put.
    #[test]
    fn winsorize_stays_within_bounds(values in amount_values(), (lower, upper) in percentiles()) {
        let column = Column::new("amount".into(), values.clone());
        let winsorized = column_f64_values(&winsorize(&column, lower, upper).unwrap());
        prop_assert_eq!(winsorized.len(), values.len());

        match winsor_bounds(&column, lower, upper).unwrap() {
            Some((lo, hi)) => {
                for (before, after) in values.iter().zip(&winsorized) {
                    prop_assert_eq!(present(before).is_none(), after.is_none());
                    if let Some(v) = after {
                        prop_assert!(*v >= lo && *v <= hi);
                    }
                }
            }
            None => prop_assert!(winsorized.iter().all(Option::is_none)),
        }
    }

    /// Outlier flags agree with the IQR fence and never flag nulls.
    #[test]
    fn outlier_flags_match_fence(values in amount_values(), k in 0.0f64..5.0) {
        let df = DataFrame::new(vec![Column::new("amount".into(), values.clone())]).unwrap();
        let flagged = add_outlier_flag(&df, "amount", k).unwrap();
        let flags: Vec<Option<bool>> = flagged
            .column("amount_outlier")
            .unwrap()
            .bool()
            .unwrap()
            .into_iter()
            .collect();
        let fence = iqr_fence(df.column("amount").unwrap(), k).unwrap();

        for (value, flag) in values.iter().zip(flags) {
            let expected = match (present(value), fence) {
                (Some(v), Some((lo, hi))) => v < lo || v > hi,
                _ => false,
            };
            prop_assert_eq!(flag, Some(expected));
        }
    }
}

// ============================================================================
// Missingness, text, dedupe
// ============================================================================

proptest! {
    /// `<col>_missing` is true exactly where the column is null.
    #[test]
    fn missing_flags_mirror_nulls(values in amount_values()) {
        let df = DataFrame::new(vec![Column::new("amount".into(), values.clone())]).unwrap();
        let flagged = add_missing_flags(&df, &["amount"]).unwrap();
        let flags: Vec<Option<bool>> = flagged
            .column("amount_missing")
            .unwrap()
            .bool()
            .unwrap()
            .into_iter()
            .collect();
        let expected: Vec<Option<bool>> = values.iter().map(|v| Some(v.is_none())).collect();
        prop_assert_eq!(flags, expected);
    }

    /// Normalizing twice is the same as normalizing once.
    #[test]
    fn normalize_value_is_idempotent(raw in "[ \\tA-Za-z]{0,20}") {
        let once = normalize_value(&raw);
        prop_assert_eq!(normalize_value(&once), once.clone());
        prop_assert!(!once.starts_with(' ') && !once.ends_with(' '));
        prop_assert!(!once.contains("  "));
    }

    /// After dedupe every non-null key appears exactly once.
    #[test]
    fn dedupe_leaves_unique_keys(keys in key_values(40), seed in 0i64..1_000) {
        let stamps: Vec<Option<String>> = (0..keys.len())
            .map(|idx| {
                let minute = (seed + idx as i64 * 7) % 60;
                (minute % 5 != 0).then(|| format!("2025-01-01 10:{minute:02}:00"))
            })
            .collect();
        let nulls = keys.iter().filter(|key| key.is_none()).count();
        let distinct: std::collections::BTreeSet<&String> = keys.iter().flatten().collect();
        let df = DataFrame::new(vec![
            Column::new("user_id".into(), keys.clone()),
            Column::new("created_at".into(), stamps),
        ])
        .unwrap();

        let deduped = dedupe_keep_latest(&df, "user_id", "created_at").unwrap();
        prop_assert_eq!(deduped.height(), distinct.len() + nulls);
    }
}
