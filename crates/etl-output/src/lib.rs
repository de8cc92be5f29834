//! Output writers.
//!
//! Every writer replaces its target in one step: content goes to a temporary
//! sibling first and is renamed over the target once fully written, so a
//! reader never sees a partially written file.

pub mod error;
pub mod writer;

pub use error::{OutputError, Result};
pub use writer::{ensure_parent_dir, write_atomic, write_csv, write_json, write_parquet, write_run_meta};
