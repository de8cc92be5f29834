use std::collections::BTreeSet;
use std::fs::File;
use std::path::Path;

use csv::ReaderBuilder;
use polars::prelude::{Column, DataFrame};
use tracing::debug;

use etl_model::NullTokens;

use crate::error::{IngestError, Result};

fn normalize_header(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('\u{feff}');
    let mut parts = trimmed.split_whitespace();
    let mut normalized = String::new();
    if let Some(first) = parts.next() {
        normalized.push_str(first);
        for part in parts {
            normalized.push(' ');
            normalized.push_str(part);
        }
    }
    normalized
}

fn open_file(path: &Path) -> Result<File> {
    File::open(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            IngestError::FileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            IngestError::FileRead {
                path: path.to_path_buf(),
                source: e,
            }
        }
    })
}

fn parse_error(path: &Path, error: &csv::Error) -> IngestError {
    IngestError::CsvParse {
        path: path.to_path_buf(),
        message: error.to_string(),
    }
}

/// Reads a delimited file into a DataFrame of text columns.
///
/// Cells matching one of `null_tokens` (after trimming) become null; every
/// other cell is kept verbatim. Short records are padded with nulls and
/// fully blank records are skipped.
pub fn read_raw_table(path: &Path, null_tokens: &NullTokens) -> Result<DataFrame> {
    let file = open_file(path)?;
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(file);

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| parse_error(path, &e))?
        .iter()
        .map(normalize_header)
        .collect();
    if headers.is_empty() {
        return Err(IngestError::NoHeader {
            path: path.to_path_buf(),
        });
    }
    let mut seen = BTreeSet::new();
    for (position, header) in headers.iter().enumerate() {
        if header.is_empty() {
            return Err(IngestError::EmptyColumnName {
                path: path.to_path_buf(),
                position,
            });
        }
        if !seen.insert(header.as_str()) {
            return Err(IngestError::DuplicateColumn {
                path: path.to_path_buf(),
                column: header.clone(),
            });
        }
    }

    let mut values: Vec<Vec<Option<String>>> = vec![Vec::new(); headers.len()];
    for record in reader.records() {
        let record = record.map_err(|e| parse_error(path, &e))?;
        if record.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }
        for (idx, column) in values.iter_mut().enumerate() {
            let cell = record.get(idx).unwrap_or("");
            if null_tokens.is_null(cell) {
                column.push(None);
            } else {
                column.push(Some(cell.to_string()));
            }
        }
    }

    let columns: Vec<Column> = headers
        .iter()
        .zip(values)
        .map(|(name, column)| Column::new(name.as_str().into(), column))
        .collect();
    let df = DataFrame::new(columns)?;
    debug!(
        path = %path.display(),
        rows = df.height(),
        columns = df.width(),
        "raw table loaded"
    );
    Ok(df)
}

/// Reads the raw orders file.
pub fn read_orders_csv(path: &Path, null_tokens: &NullTokens) -> Result<DataFrame> {
    read_raw_table(path, null_tokens)
}

/// Reads the raw users file.
pub fn read_users_csv(path: &Path, null_tokens: &NullTokens) -> Result<DataFrame> {
    read_raw_table(path, null_tokens)
}
