//! Raw table ingestion.
//!
//! Reads delimited files into all-text Polars DataFrames. Typing is left to
//! the schema enforcer; this crate only decides which cells are null.

pub mod csv_table;
pub mod error;

pub use csv_table::{read_orders_csv, read_raw_table, read_users_csv};
pub use error::{IngestError, Result};
