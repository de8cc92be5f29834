//! Configuration options for a pipeline run.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{QualityError, Result};

/// Null spellings recognized on read.
pub const DEFAULT_NULL_TOKENS: &[&str] =
    &["", "NA", "N/A", "null", "NULL", "None", "nan", "NaN", "non"];

/// Default IQR multiplier for the outlier fence.
pub const DEFAULT_IQR_K: f64 = 1.5;

/// Set of raw cell spellings treated as null.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NullTokens(Vec<String>);

impl Default for NullTokens {
    fn default() -> Self {
        Self(DEFAULT_NULL_TOKENS.iter().map(|t| (*t).to_string()).collect())
    }
}

impl NullTokens {
    pub fn new<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(tokens.into_iter().map(Into::into).collect())
    }

    /// Returns true if the trimmed cell is blank or one of the tokens.
    pub fn is_null(&self, raw: &str) -> bool {
        let trimmed = raw.trim();
        trimmed.is_empty() || self.0.iter().any(|token| token.trim() == trimmed)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

/// Explicit raw-to-canonical lookup for the order status.
///
/// Keys are matched after text normalization; values absent from the map
/// pass through unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StatusMapping(BTreeMap<String, String>);

impl Default for StatusMapping {
    fn default() -> Self {
        Self(BTreeMap::from([
            ("paid".to_string(), "paid".to_string()),
            ("refund".to_string(), "refund".to_string()),
            ("refunded".to_string(), "refund".to_string()),
        ]))
    }
}

impl StatusMapping {
    pub fn new(map: BTreeMap<String, String>) -> Self {
        Self(map)
    }

    /// Parse a JSON object of `"raw": "canonical"` pairs.
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| QualityError::InvalidParameter {
            name: "status mapping".to_string(),
            reason: e.to_string(),
        })
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn as_map(&self) -> &BTreeMap<String, String> {
        &self.0
    }
}

/// Percentile bounds for winsorizing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WinsorizeOptions {
    pub lower: f64,
    pub upper: f64,
}

impl Default for WinsorizeOptions {
    fn default() -> Self {
        Self {
            lower: 0.01,
            upper: 0.99,
        }
    }
}

impl WinsorizeOptions {
    /// Bounds must satisfy `0 <= lower <= upper <= 1`.
    pub fn validate(&self) -> Result<()> {
        let in_unit = |v: f64| (0.0..=1.0).contains(&v);
        if in_unit(self.lower) && in_unit(self.upper) && self.lower <= self.upper {
            Ok(())
        } else {
            Err(QualityError::InvalidParameter {
                name: "winsorize percentiles".to_string(),
                reason: format!(
                    "expected 0 <= lower <= upper <= 1, got lower={} upper={}",
                    self.lower, self.upper
                ),
            })
        }
    }
}

/// Options controlling one pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineOptions {
    pub null_tokens: NullTokens,
    pub status_mapping: StatusMapping,
    pub winsorize: WinsorizeOptions,
    /// IQR multiplier for the outlier fence.
    pub iqr_k: f64,
    /// Keep only the latest order per `order_id` during the clean stage.
    pub dedupe: bool,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            null_tokens: NullTokens::default(),
            status_mapping: StatusMapping::default(),
            winsorize: WinsorizeOptions::default(),
            iqr_k: DEFAULT_IQR_K,
            dedupe: false,
        }
    }
}

impl PipelineOptions {
    pub fn with_winsorize(mut self, lower: f64, upper: f64) -> Self {
        self.winsorize = WinsorizeOptions { lower, upper };
        self
    }

    pub fn with_iqr_k(mut self, k: f64) -> Self {
        self.iqr_k = k;
        self
    }

    pub fn with_status_mapping(mut self, mapping: StatusMapping) -> Self {
        self.status_mapping = mapping;
        self
    }

    pub fn with_null_tokens(mut self, tokens: NullTokens) -> Self {
        self.null_tokens = tokens;
        self
    }

    pub fn with_dedupe(mut self, enable: bool) -> Self {
        self.dedupe = enable;
        self
    }

    /// Resolved option values rendered as strings for run metadata.
    pub fn to_string_map(&self) -> BTreeMap<String, String> {
        let mut map = BTreeMap::new();
        map.insert("winsor_lower".to_string(), self.winsorize.lower.to_string());
        map.insert("winsor_upper".to_string(), self.winsorize.upper.to_string());
        map.insert("iqr_k".to_string(), self.iqr_k.to_string());
        map.insert("dedupe".to_string(), self.dedupe.to_string());
        map.insert(
            "null_tokens".to_string(),
            format!("{:?}", self.null_tokens.as_slice()),
        );
        map.insert(
            "status_mapping".to_string(),
            serde_json::to_string(self.status_mapping.as_map()).unwrap_or_default(),
        );
        map
    }
}
