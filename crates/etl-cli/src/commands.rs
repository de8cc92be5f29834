use anyhow::{Context, Result};
use tracing::info_span;

use etl_cli::pipeline::{run_clean, run_etl, run_load};
use etl_cli::types::{RunReport, Stage};
use etl_model::{EtlConfig, NullTokens, PipelineOptions, StatusMapping};

use crate::cli::RunArgs;

/// Resolve file locations from `--root` and the path overrides.
pub fn config_from_args(args: &RunArgs) -> EtlConfig {
    let mut config = EtlConfig::from_root(&args.root);
    if let Some(dir) = &args.out_dir {
        config = config.with_output_dir(dir);
    }
    if let Some(path) = &args.orders {
        config = config.with_raw_orders(path.clone());
    }
    if let Some(path) = &args.users {
        config = config.with_raw_users(path.clone());
    }
    config
}

/// Resolve pipeline options from the flags; invalid values fail before any I/O.
pub fn options_from_args(args: &RunArgs) -> Result<PipelineOptions> {
    let mut options = PipelineOptions::default()
        .with_winsorize(args.winsor_lower, args.winsor_upper)
        .with_iqr_k(args.iqr_k)
        .with_dedupe(args.dedupe);
    options.winsorize.validate().context("--winsor-lower/--winsor-upper")?;
    if !args.iqr_k.is_finite() || args.iqr_k < 0.0 {
        anyhow::bail!("--iqr-k must be a finite value >= 0, got {}", args.iqr_k);
    }
    if let Some(json) = &args.status_mapping {
        let mapping = StatusMapping::from_json_str(json).context("--status-mapping")?;
        options = options.with_status_mapping(mapping);
    }
    if !args.null_tokens.is_empty() {
        options = options.with_null_tokens(NullTokens::new(args.null_tokens.iter().cloned()));
    }
    Ok(options)
}

pub fn run_stage(stage: Stage, args: &RunArgs) -> Result<RunReport> {
    let config = config_from_args(args);
    let options = options_from_args(args)?;
    let span = info_span!("run", stage = %stage, root = %config.root.display());
    let _guard = span.enter();
    match stage {
        Stage::Load => run_load(&config, &options),
        Stage::Clean => run_clean(&config, &options),
        Stage::Etl => run_etl(&config, &options),
    }
}
