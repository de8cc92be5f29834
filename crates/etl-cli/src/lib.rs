//! Library side of the orders ETL command: orchestration, metadata and logging.

pub mod logging;
pub mod pipeline;
pub mod run_meta;
pub mod types;
