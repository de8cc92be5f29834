//! Table transformation stages.
//!
//! Every stage takes a borrowed DataFrame (or column) and returns a new value,
//! leaving its input untouched:
//!
//! - **schema**: coerce a raw table into a declared schema
//! - **text**: categorical text cleanup and explicit value mapping
//! - **missing**: per-column missingness flags
//! - **datetime**: timestamp parsing and calendar parts
//! - **outliers**: winsorizing and IQR fence flags
//! - **join**: left join with a cardinality contract
//! - **dedupe**: keep the latest row per key

pub mod datetime;
pub mod dedupe;
pub mod join;
pub mod missing;
pub mod outliers;
pub mod schema;
pub mod text;

pub use datetime::{add_time_parts, parse_datetime, parse_timestamp};
pub use dedupe::dedupe_keep_latest;
pub use join::{check_row_count, safe_left_join};
pub use missing::add_missing_flags;
pub use outliers::{
    add_outlier_flag, add_winsor_column, iqr_fence, quantile, winsor_bounds, winsorize,
};
pub use schema::{enforce_orders_schema, enforce_schema, enforce_users_schema};
pub use text::{apply_mapping, count_unmapped, normalize_text, normalize_value};
