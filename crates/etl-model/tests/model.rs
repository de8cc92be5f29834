use std::collections::BTreeMap;
use std::path::PathBuf;

use etl_model::{
    EtlConfig, NullTokens, ORDERS_SCHEMA, PipelineOptions, RunMetadata, StatusMapping,
    USERS_SCHEMA,
};

fn sample_metadata() -> RunMetadata {
    RunMetadata {
        rows_out: 4,
        columns: vec!["order_id".to_string(), "amount".to_string()],
        config: BTreeMap::from([("iqr_k".to_string(), "1.5".to_string())]),
        missing_created_at: 1,
        country_match_rate: 0.75,
        unmapped_status_count: 0,
        analytics_fingerprint: "ab12".to_string(),
    }
}

#[test]
fn run_metadata_serializes_stable_fields() {
    insta::assert_json_snapshot!(sample_metadata(), @r#"
    {
      "rows_out": 4,
      "columns": [
        "order_id",
        "amount"
      ],
      "config": {
        "iqr_k": "1.5"
      },
      "missing_created_at": 1,
      "country_match_rate": 0.75,
      "unmapped_status_count": 0,
      "analytics_fingerprint": "ab12"
    }
    "#);
}

#[test]
fn run_metadata_reads_back() {
    let meta = sample_metadata();
    let json = serde_json::to_string(&meta).unwrap();
    let parsed: RunMetadata = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, meta);
}

#[test]
fn schemas_declare_their_keys() {
    assert!(ORDERS_SCHEMA.column_names().contains(&ORDERS_SCHEMA.key));
    assert!(USERS_SCHEMA.column_names().contains(&USERS_SCHEMA.key));
    assert!(ORDERS_SCHEMA.column_names().contains(&"status"));
    assert!(!USERS_SCHEMA.column_names().contains(&"status"));
}

#[test]
fn options_render_into_metadata_config() {
    let options = PipelineOptions::default()
        .with_iqr_k(3.0)
        .with_null_tokens(NullTokens::new(["-"]))
        .with_status_mapping(StatusMapping::from_json_str(r#"{"ok":"paid"}"#).unwrap());
    let map = options.to_string_map();
    assert_eq!(map.get("iqr_k").map(String::as_str), Some("3"));
    assert_eq!(map.get("dedupe").map(String::as_str), Some("false"));
    assert_eq!(
        map.get("status_mapping").map(String::as_str),
        Some(r#"{"ok":"paid"}"#)
    );

    let config = EtlConfig::from_root("/data");
    let paths = config.to_string_map();
    assert_eq!(
        paths.get("out_analytics").map(PathBuf::from),
        Some(PathBuf::from("/data/data/processed/analytics_table.parquet"))
    );
}

#[test]
fn null_tokens_match_trimmed_cells() {
    let tokens = NullTokens::default();
    assert!(tokens.is_null("  NA "));
    assert!(tokens.is_null(""));
    assert!(!tokens.is_null("na"));
    assert!(!tokens.is_null("0"));
}
