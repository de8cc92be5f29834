//! Data-quality gates and reports.
//!
//! Gates are eager: each returns `Ok(())` or the first [`QualityError`] it
//! finds, and the caller aborts the run. The missingness report is the only
//! soft signal and never fails.
//!
//! [`QualityError`]: etl_model::QualityError

pub mod gate;
pub mod missingness;

pub use gate::{assert_in_range, assert_non_empty, assert_unique_key, require_columns};
pub use missingness::{ColumnMissingness, missingness_report, missingness_stats};
