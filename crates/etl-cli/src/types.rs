use std::fmt;
use std::path::PathBuf;

use etl_model::RunMetadata;
use etl_validate::ColumnMissingness;

/// Which entry point produced a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Load,
    Clean,
    Etl,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Load => "load",
            Self::Clean => "clean",
            Self::Etl => "etl",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One file written by a run.
#[derive(Debug, Clone, PartialEq)]
pub struct WrittenOutput {
    pub label: &'static str,
    pub path: PathBuf,
    pub rows: usize,
    pub columns: usize,
}

/// Outcome of a successful run, for the summary printer and tests.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub stage: Stage,
    pub outputs: Vec<WrittenOutput>,
    /// Orders missingness, when the stage computes it.
    pub missingness: Vec<ColumnMissingness>,
    pub unmapped_status_count: usize,
    /// Set by the full ETL run only.
    pub metadata: Option<RunMetadata>,
}

impl RunReport {
    pub fn new(stage: Stage) -> Self {
        Self {
            stage,
            outputs: Vec::new(),
            missingness: Vec::new(),
            unmapped_status_count: 0,
            metadata: None,
        }
    }

    pub fn output(&self, label: &str) -> Option<&WrittenOutput> {
        self.outputs.iter().find(|output| output.label == label)
    }
}
