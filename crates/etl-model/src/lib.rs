pub mod config;
pub mod error;
pub mod join;
pub mod metadata;
pub mod options;
pub mod schema;

pub use config::EtlConfig;
pub use error::{ErrorKind, QualityError, Result};
pub use join::{JoinSide, JoinValidation};
pub use metadata::RunMetadata;
pub use options::{
    DEFAULT_IQR_K, DEFAULT_NULL_TOKENS, NullTokens, PipelineOptions, StatusMapping,
    WinsorizeOptions,
};
pub use schema::{ColumnSpec, ColumnType, ORDERS_SCHEMA, TableSchema, USERS_SCHEMA, columns};
