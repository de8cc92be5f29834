//! Pipeline orchestration for the load, clean and full ETL runs.
//!
//! Stages are pure functions over borrowed frames; this module sequences
//! them, applies the quality gates between them and writes the outputs.
//! Run metadata is always written last, so its presence marks a complete run.

use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use polars::prelude::DataFrame;
use tracing::{debug, info, info_span, warn};

use etl_ingest::{read_orders_csv, read_users_csv};
use etl_model::{
    EtlConfig, JoinValidation, ORDERS_SCHEMA, PipelineOptions, USERS_SCHEMA, columns,
};
use etl_output::{write_csv, write_parquet, write_run_meta};
use etl_transform::{
    add_missing_flags, add_outlier_flag, add_time_parts, add_winsor_column, apply_mapping,
    check_row_count, count_unmapped, dedupe_keep_latest, enforce_orders_schema,
    enforce_users_schema, normalize_text, parse_datetime, safe_left_join,
};
use etl_validate::{
    assert_in_range, assert_non_empty, assert_unique_key, missingness_report, missingness_stats,
    require_columns,
};

use crate::run_meta::build_run_metadata;
use crate::types::{RunReport, Stage, WrittenOutput};

/// Raw tables as read from disk.
#[derive(Debug, Clone)]
pub struct RawInputs {
    pub orders: DataFrame,
    pub users: DataFrame,
}

/// Orders after schema enforcement, status mapping and missingness flags.
#[derive(Debug, Clone)]
pub struct StandardOrders {
    /// Schema-enforced orders, before any derived column.
    pub typed: DataFrame,
    pub orders: DataFrame,
    pub unmapped_status_count: usize,
}

/// Result of the full transform.
#[derive(Debug, Clone)]
pub struct Transformed {
    pub analytics: DataFrame,
    pub users: DataFrame,
    /// Typed orders before the join, used for the missingness report.
    pub orders_typed: DataFrame,
    pub unmapped_status_count: usize,
}

/// Read both raw inputs.
pub fn load_inputs(config: &EtlConfig, options: &PipelineOptions) -> Result<RawInputs> {
    let span = info_span!("load", orders = %config.raw_orders.display(), users = %config.raw_users.display());
    let _guard = span.enter();
    let start = Instant::now();

    let orders = read_orders_csv(&config.raw_orders, &options.null_tokens)
        .with_context(|| format!("read {}", config.raw_orders.display()))?;
    let users = read_users_csv(&config.raw_users, &options.null_tokens)
        .with_context(|| format!("read {}", config.raw_users.display()))?;

    info!(
        orders_rows = orders.height(),
        users_rows = users.height(),
        duration_ms = start.elapsed().as_millis(),
        "raw inputs loaded"
    );
    Ok(RawInputs { orders, users })
}

/// Keep the latest order per `order_id` when deduplication is enabled.
pub fn dedupe_orders(orders: &DataFrame, options: &PipelineOptions) -> Result<DataFrame> {
    if !options.dedupe {
        return Ok(orders.clone());
    }
    let deduped = dedupe_keep_latest(orders, columns::ORDER_ID, columns::CREATED_AT)
        .context("dedupe orders")?;
    info!(
        rows = deduped.height(),
        removed = orders.height() - deduped.height(),
        "orders deduplicated"
    );
    Ok(deduped)
}

/// Required columns, non-empty tables and unique keys on the raw inputs.
pub fn gate_raw_inputs(inputs: &RawInputs) -> Result<()> {
    require_columns(&inputs.orders, &ORDERS_SCHEMA.column_names(), ORDERS_SCHEMA.name)?;
    require_columns(&inputs.users, &USERS_SCHEMA.column_names(), USERS_SCHEMA.name)?;
    assert_non_empty(&inputs.orders, ORDERS_SCHEMA.name)?;
    assert_non_empty(&inputs.users, USERS_SCHEMA.name)?;
    assert_unique_key(&inputs.orders, ORDERS_SCHEMA.key)?;
    assert_unique_key(&inputs.users, USERS_SCHEMA.key)?;
    Ok(())
}

/// Enforce the orders schema, add `status_clean` and the missingness flags.
pub fn standardize_orders(
    orders_raw: &DataFrame,
    options: &PipelineOptions,
) -> Result<StandardOrders> {
    let typed = enforce_orders_schema(orders_raw).context("enforce orders schema")?;

    let status = normalize_text(typed.column(columns::STATUS)?);
    let mapping = options.status_mapping.as_map();
    let unmapped_status_count = count_unmapped(&status, mapping);
    if unmapped_status_count > 0 {
        warn!(
            column = columns::STATUS,
            unmapped = unmapped_status_count,
            "status values without a mapping entry kept as normalized text"
        );
    }
    let status_clean = apply_mapping(&status, mapping).with_name(columns::STATUS_CLEAN.into());

    let mut orders = typed.clone();
    orders.with_column(status_clean)?;
    let orders = add_missing_flags(&orders, &[columns::AMOUNT, columns::QUANTITY])?;
    Ok(StandardOrders {
        typed,
        orders,
        unmapped_status_count,
    })
}

/// `amount` and `quantity` must not be negative.
pub fn gate_order_ranges(orders: &DataFrame) -> Result<()> {
    for name in [columns::AMOUNT, columns::QUANTITY] {
        assert_in_range(orders.column(name)?, 0.0, None, name)?;
    }
    Ok(())
}

/// Gate, type and enrich the orders, join users and flag outliers.
pub fn transform(inputs: &RawInputs, options: &PipelineOptions) -> Result<Transformed> {
    let span = info_span!("transform", orders_rows = inputs.orders.height());
    let _guard = span.enter();
    let start = Instant::now();

    gate_raw_inputs(inputs)?;
    let users = enforce_users_schema(&inputs.users).context("enforce users schema")?;
    let StandardOrders {
        typed: orders_typed,
        orders,
        unmapped_status_count,
    } = standardize_orders(&inputs.orders, options)?;
    let orders = parse_datetime(&orders, columns::CREATED_AT)?;
    let orders = add_time_parts(&orders, columns::CREATED_AT)?;
    gate_order_ranges(&orders)?;
    debug!(
        rows = orders.height(),
        columns = orders.width(),
        duration_ms = start.elapsed().as_millis(),
        "orders standardized"
    );

    let joined = info_span!("join").in_scope(|| -> Result<DataFrame> {
        let start = Instant::now();
        let joined = safe_left_join(
            &orders,
            &users,
            columns::USER_ID,
            JoinValidation::ManyToOne,
            ("", "_user"),
        )?;
        check_row_count(orders.height(), joined.height())?;
        info!(
            rows = joined.height(),
            columns = joined.width(),
            duration_ms = start.elapsed().as_millis(),
            "orders joined with users"
        );
        Ok(joined)
    })?;

    let analytics = info_span!("outliers").in_scope(|| -> Result<DataFrame> {
        let start = Instant::now();
        let analytics = add_winsor_column(&joined, columns::AMOUNT, &options.winsorize)?;
        let analytics = add_outlier_flag(&analytics, columns::AMOUNT, options.iqr_k)?;
        debug!(
            rows = analytics.height(),
            duration_ms = start.elapsed().as_millis(),
            "outlier columns added"
        );
        Ok(analytics)
    })?;

    assert_in_range(analytics.column(columns::AMOUNT)?, 0.0, None, columns::AMOUNT)?;
    assert_unique_key(&analytics, columns::ORDER_ID)?;
    assert_non_empty(&analytics, "analytics")?;

    info!(
        rows = analytics.height(),
        columns = analytics.width(),
        duration_ms = start.elapsed().as_millis(),
        "transform complete"
    );
    Ok(Transformed {
        analytics,
        users,
        orders_typed,
        unmapped_status_count,
    })
}

/// Analytics without the user attributes; the join key is kept.
pub fn split_orders_clean(analytics: &DataFrame, users: &DataFrame) -> Result<DataFrame> {
    let mut orders_clean = analytics.clone();
    for name in users.get_column_names() {
        if name.as_str() != columns::USER_ID && orders_clean.column(name.as_str()).is_ok() {
            orders_clean = orders_clean.drop(name.as_str())?;
        }
    }
    Ok(orders_clean)
}

fn write_table(report: &mut RunReport, label: &'static str, path: &Path, df: &DataFrame) -> Result<()> {
    write_parquet(path, df).with_context(|| format!("write {label}"))?;
    info!(path = %path.display(), rows = df.height(), columns = df.width(), "{label} written");
    report.outputs.push(WrittenOutput {
        label,
        path: path.to_path_buf(),
        rows: df.height(),
        columns: df.width(),
    });
    Ok(())
}

fn write_missingness(report: &mut RunReport, config: &EtlConfig, orders: &DataFrame) -> Result<()> {
    let path = config.missingness_report_path();
    let table = missingness_report(orders)?;
    write_csv(&path, &table).context("write missingness report")?;
    report.missingness = missingness_stats(orders);
    report.outputs.push(WrittenOutput {
        label: "missingness",
        path,
        rows: table.height(),
        columns: table.width(),
    });
    Ok(())
}

/// Read both inputs, enforce their schemas and write typed snapshots.
pub fn run_load(config: &EtlConfig, options: &PipelineOptions) -> Result<RunReport> {
    let inputs = load_inputs(config, options)?;
    let orders = enforce_orders_schema(&inputs.orders).context("enforce orders schema")?;
    let users = enforce_users_schema(&inputs.users).context("enforce users schema")?;

    let mut report = RunReport::new(Stage::Load);
    info_span!("write").in_scope(|| -> Result<()> {
        write_table(&mut report, "orders", &config.out_orders, &orders)?;
        write_table(&mut report, "users", &config.out_users, &users)
    })?;
    Ok(report)
}

/// Gate the inputs, report missingness and write cleaned orders and users.
pub fn run_clean(config: &EtlConfig, options: &PipelineOptions) -> Result<RunReport> {
    let mut inputs = load_inputs(config, options)?;
    inputs.orders = dedupe_orders(&inputs.orders, options)?;
    gate_raw_inputs(&inputs)?;

    let users = enforce_users_schema(&inputs.users).context("enforce users schema")?;
    let standard = standardize_orders(&inputs.orders, options)?;
    gate_order_ranges(&standard.orders)?;

    let mut report = RunReport::new(Stage::Clean);
    report.unmapped_status_count = standard.unmapped_status_count;
    info_span!("write").in_scope(|| -> Result<()> {
        write_missingness(&mut report, config, &standard.typed)?;
        write_table(&mut report, "orders_clean", &config.out_orders_clean, &standard.orders)?;
        write_table(&mut report, "users", &config.out_users, &users)
    })?;
    Ok(report)
}

/// The full flow: load, gate, transform, join, flag outliers, write.
pub fn run_etl(config: &EtlConfig, options: &PipelineOptions) -> Result<RunReport> {
    let run_start = Instant::now();
    let mut inputs = load_inputs(config, options)?;
    inputs.orders = dedupe_orders(&inputs.orders, options)?;
    let transformed = transform(&inputs, options)?;
    let orders_clean = split_orders_clean(&transformed.analytics, &transformed.users)?;

    let mut report = RunReport::new(Stage::Etl);
    report.unmapped_status_count = transformed.unmapped_status_count;
    info_span!("write").in_scope(|| -> Result<()> {
        write_table(&mut report, "analytics", &config.out_analytics, &transformed.analytics)?;
        write_table(&mut report, "users", &config.out_users, &transformed.users)?;
        write_table(&mut report, "orders_clean", &config.out_orders_clean, &orders_clean)?;
        write_missingness(&mut report, config, &transformed.orders_typed)
    })?;

    let metadata = build_run_metadata(
        &transformed.analytics,
        config,
        options,
        transformed.unmapped_status_count,
    );
    write_run_meta(&config.run_meta, &metadata).context("write run metadata")?;
    info!(
        path = %config.run_meta.display(),
        rows_out = metadata.rows_out,
        country_match_rate = metadata.country_match_rate,
        duration_ms = run_start.elapsed().as_millis(),
        "ETL run finished"
    );
    report.metadata = Some(metadata);
    Ok(report)
}
