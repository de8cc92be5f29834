use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Summary record describing one pipeline execution.
///
/// Holds no wall-clock fields, so two runs over the same inputs produce the
/// same document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunMetadata {
    pub rows_out: usize,
    pub columns: Vec<String>,
    /// Resolved paths and options as strings.
    pub config: BTreeMap<String, String>,
    pub missing_created_at: usize,
    /// Fraction of analytics rows with a resolved `country`, in `[0, 1]`.
    pub country_match_rate: f64,
    /// Non-null status values that had no entry in the mapping.
    pub unmapped_status_count: usize,
    /// Hex SHA-256 of the analytics cells.
    pub analytics_fingerprint: String,
}
