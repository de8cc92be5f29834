//! Shared helpers for the ETL crates.

pub mod polars;

pub use polars::{any_to_string, column_f64_values, column_text_values, format_numeric};
