//! Run metadata assembly.

use polars::prelude::{AnyValue, DataFrame};
use sha2::{Digest, Sha256};

use etl_common::any_to_string;
use etl_model::{EtlConfig, PipelineOptions, RunMetadata, columns};

const FIELD_SEPARATOR: u8 = 0x1f;
const NULL_MARKER: &[u8] = b"\0";

/// Hex SHA-256 over the column names, dtypes and every cell of `df`.
///
/// Cells are rendered row by row; nulls get a marker distinct from the empty
/// string. Equal tables always hash equal.
pub fn analytics_fingerprint(df: &DataFrame) -> String {
    let mut hasher = Sha256::new();
    for column in df.get_columns() {
        hasher.update(column.name().as_bytes());
        hasher.update(b":");
        hasher.update(column.dtype().to_string().as_bytes());
        hasher.update([FIELD_SEPARATOR]);
    }
    hasher.update(b"\n");
    for row in 0..df.height() {
        for column in df.get_columns() {
            match column.get(row).unwrap_or(AnyValue::Null) {
                AnyValue::Null => hasher.update(NULL_MARKER),
                value => hasher.update(any_to_string(value).as_bytes()),
            }
            hasher.update([FIELD_SEPARATOR]);
        }
        hasher.update(b"\n");
    }
    hex::encode(hasher.finalize())
}

/// Share of rows with a non-null `country`. Zero when the column is absent or
/// the table is empty.
pub fn country_match_rate(df: &DataFrame) -> f64 {
    match df.column(columns::COUNTRY) {
        Ok(country) if df.height() > 0 => {
            1.0 - country.null_count() as f64 / df.height() as f64
        }
        _ => 0.0,
    }
}

fn null_count(df: &DataFrame, name: &str) -> usize {
    df.column(name).map_or(0, |column| column.null_count())
}

/// Summary record for a finished ETL run.
pub fn build_run_metadata(
    analytics: &DataFrame,
    config: &EtlConfig,
    options: &PipelineOptions,
    unmapped_status_count: usize,
) -> RunMetadata {
    let mut resolved = config.to_string_map();
    resolved.extend(options.to_string_map());
    RunMetadata {
        rows_out: analytics.height(),
        columns: analytics
            .get_column_names()
            .iter()
            .map(|name| name.to_string())
            .collect(),
        config: resolved,
        missing_created_at: null_count(analytics, columns::CREATED_AT),
        country_match_rate: country_match_rate(analytics),
        unmapped_status_count,
        analytics_fingerprint: analytics_fingerprint(analytics),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::Column;

    fn analytics() -> DataFrame {
        DataFrame::new(vec![
            Column::new("order_id".into(), vec!["o1", "o2", "o3", "o4"]),
            Column::new("country".into(), vec![Some("SA"), None, Some("AE"), Some("SA")]),
            Column::new("created_at".into(), vec![Some("2025-01-01"), None, None, Some("x")]),
        ])
        .unwrap()
    }

    #[test]
    fn match_rate_counts_resolved_countries() {
        assert_eq!(country_match_rate(&analytics()), 0.75);
        assert_eq!(country_match_rate(&analytics().head(Some(0))), 0.0);
        assert_eq!(country_match_rate(&analytics().drop("country").unwrap()), 0.0);
    }

    #[test]
    fn fingerprint_tracks_content() {
        let base = analytics_fingerprint(&analytics());
        assert_eq!(base.len(), 64);
        assert_eq!(base, analytics_fingerprint(&analytics()));

        let empty_instead_of_null = DataFrame::new(vec![
            Column::new("order_id".into(), vec!["o1", "o2", "o3", "o4"]),
            Column::new("country".into(), vec![Some("SA"), Some(""), Some("AE"), Some("SA")]),
            Column::new("created_at".into(), vec![Some("2025-01-01"), None, None, Some("x")]),
        ])
        .unwrap();
        assert_ne!(base, analytics_fingerprint(&empty_instead_of_null));
    }

    #[test]
    fn metadata_merges_paths_and_options() {
        let config = EtlConfig::from_root("/project");
        let meta = build_run_metadata(&analytics(), &config, &PipelineOptions::default(), 2);
        assert_eq!(meta.rows_out, 4);
        assert_eq!(meta.missing_created_at, 2);
        assert_eq!(meta.unmapped_status_count, 2);
        assert_eq!(meta.config.get("iqr_k").map(String::as_str), Some("1.5"));
        assert!(meta.config.contains_key("out_analytics"));
        assert_eq!(meta.columns, vec!["order_id", "country", "created_at"]);
    }
}
