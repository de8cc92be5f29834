//! Error taxonomy for data-quality failures.
//!
//! Every variant is fatal to a run. Variants carry the offending table or
//! column so the failure can be traced without re-running the pipeline.

use std::fmt;

use thiserror::Error;

use crate::join::{JoinSide, JoinValidation};

/// Data-integrity failures raised by gates, the schema enforcer and the joiner.
#[derive(Debug, Error)]
pub enum QualityError {
    /// One or more required columns are absent.
    #[error("{table}: missing required columns: {}", join_list(.missing))]
    Schema { table: String, missing: Vec<String> },

    /// Two columns would end up with the same name.
    #[error("{table}: column name collision on '{column}'")]
    ColumnConflict { table: String, column: String },

    /// The table has zero rows.
    #[error("{label} has 0 rows")]
    EmptyInput { label: String },

    /// The declared key is not unique or contains nulls.
    #[error(
        "{column}: key is not unique ({duplicates} duplicated value(s), {nulls} null key(s)){}",
        sample_suffix(.samples)
    )]
    DuplicateKey {
        column: String,
        duplicates: usize,
        nulls: usize,
        samples: Vec<String>,
    },

    /// Present values fall outside the declared bounds.
    #[error(
        "{column}: {violations} value(s) outside [{lo}, {}]{}",
        upper_bound(.hi),
        sample_suffix(.samples)
    )]
    Range {
        column: String,
        lo: f64,
        hi: Option<f64>,
        violations: usize,
        samples: Vec<String>,
    },

    /// The inputs violate the declared join multiplicity.
    #[error(
        "join on '{key}' violates {validate} contract: {side} key has {duplicates} duplicated value(s){}",
        sample_suffix(.samples)
    )]
    JoinCardinality {
        key: String,
        validate: JoinValidation,
        side: JoinSide,
        duplicates: usize,
        samples: Vec<String>,
    },

    /// The joined row count differs from the left row count.
    #[error("join explosion: expected {expected} row(s), got {actual}")]
    JoinExplosion { expected: usize, actual: usize },

    /// A stage was called with an invalid argument.
    #[error("invalid {name}: {reason}")]
    InvalidParameter { name: String, reason: String },

    /// Failed DataFrame operation.
    #[error("DataFrame operation failed: {message}")]
    DataFrame { message: String },
}

impl From<polars::prelude::PolarsError> for QualityError {
    fn from(err: polars::prelude::PolarsError) -> Self {
        Self::DataFrame {
            message: err.to_string(),
        }
    }
}

/// Stable failure kind names, independent of message wording.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    SchemaError,
    EmptyInputError,
    DuplicateKeyError,
    RangeError,
    JoinCardinalityError,
    JoinExplosionError,
    InvalidParameter,
    DataFrameError,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::SchemaError => "SchemaError",
            Self::EmptyInputError => "EmptyInputError",
            Self::DuplicateKeyError => "DuplicateKeyError",
            Self::RangeError => "RangeError",
            Self::JoinCardinalityError => "JoinCardinalityError",
            Self::JoinExplosionError => "JoinExplosionError",
            Self::InvalidParameter => "InvalidParameter",
            Self::DataFrameError => "DataFrameError",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl QualityError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Schema { .. } | Self::ColumnConflict { .. } => ErrorKind::SchemaError,
            Self::EmptyInput { .. } => ErrorKind::EmptyInputError,
            Self::DuplicateKey { .. } => ErrorKind::DuplicateKeyError,
            Self::Range { .. } => ErrorKind::RangeError,
            Self::JoinCardinality { .. } => ErrorKind::JoinCardinalityError,
            Self::JoinExplosion { .. } => ErrorKind::JoinExplosionError,
            Self::InvalidParameter { .. } => ErrorKind::InvalidParameter,
            Self::DataFrame { .. } => ErrorKind::DataFrameError,
        }
    }
}

/// Result type for quality-checked operations.
pub type Result<T> = std::result::Result<T, QualityError>;

fn join_list(items: &[String]) -> String {
    items.join(", ")
}

fn sample_suffix(samples: &[String]) -> String {
    if samples.is_empty() {
        String::new()
    } else {
        format!(" (e.g. {})", samples.join(", "))
    }
}

fn upper_bound(hi: &Option<f64>) -> String {
    match hi {
        Some(value) => value.to_string(),
        None => "inf".to_string(),
    }
}
