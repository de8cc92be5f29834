//! Resolved file locations for a run.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Named paths consumed by the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EtlConfig {
    pub root: PathBuf,
    pub raw_orders: PathBuf,
    pub raw_users: PathBuf,
    /// Typed orders snapshot written by the load stage.
    pub out_orders: PathBuf,
    pub out_orders_clean: PathBuf,
    pub out_users: PathBuf,
    pub out_analytics: PathBuf,
    pub run_meta: PathBuf,
    pub reports_dir: PathBuf,
}

impl EtlConfig {
    /// Standard project layout: `data/raw`, `data/processed`, `reports`.
    pub fn from_root(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let raw = root.join("data").join("raw");
        let processed = root.join("data").join("processed");
        Self {
            raw_orders: raw.join("orders.csv"),
            raw_users: raw.join("users.csv"),
            out_orders: processed.join("orders.parquet"),
            out_orders_clean: processed.join("orders_clean.parquet"),
            out_users: processed.join("users.parquet"),
            out_analytics: processed.join("analytics_table.parquet"),
            run_meta: processed.join("_run_meta.json"),
            reports_dir: root.join("reports"),
            root,
        }
    }

    /// Redirect the processed tables and `_run_meta.json` into `dir`, keeping
    /// file names. `reports_dir` stays under `root`.
    pub fn with_output_dir(mut self, dir: &Path) -> Self {
        for path in [
            &mut self.out_orders,
            &mut self.out_orders_clean,
            &mut self.out_users,
            &mut self.out_analytics,
            &mut self.run_meta,
        ] {
            if let Some(name) = path.file_name() {
                *path = dir.join(name);
            }
        }
        self
    }

    pub fn with_raw_orders(mut self, path: PathBuf) -> Self {
        self.raw_orders = path;
        self
    }

    pub fn with_raw_users(mut self, path: PathBuf) -> Self {
        self.raw_users = path;
        self
    }

    pub fn missingness_report_path(&self) -> PathBuf {
        self.reports_dir.join("missingness_orders.csv")
    }

    /// All paths rendered as strings, keyed by field name.
    pub fn to_string_map(&self) -> BTreeMap<String, String> {
        let entries: [(&str, &Path); 9] = [
            ("root", &self.root),
            ("raw_orders", &self.raw_orders),
            ("raw_users", &self.raw_users),
            ("out_orders", &self.out_orders),
            ("out_orders_clean", &self.out_orders_clean),
            ("out_users", &self.out_users),
            ("out_analytics", &self.out_analytics),
            ("run_meta", &self.run_meta),
            ("reports_dir", &self.reports_dir),
        ];
        entries
            .into_iter()
            .map(|(key, path)| (key.to_string(), path.display().to_string()))
            .collect()
    }
}
