use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use polars::prelude::{CsvWriter, DataFrame, ParquetWriter, PolarsError, SerWriter};
use serde::Serialize;
use tracing::debug;

use etl_model::RunMetadata;

use crate::error::{OutputError, Result};

/// Create the parent directory of `path` if needed.
pub fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|source| OutputError::Io {
            operation: "create directory",
            path: parent.to_path_buf(),
            source,
        })?;
    }
    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Write `path` through a temporary sibling that is renamed into place.
///
/// The temporary file is removed if `write` fails.
pub fn write_atomic<F>(path: &Path, write: F) -> Result<()>
where
    F: FnOnce(&mut File) -> Result<()>,
{
    ensure_parent_dir(path)?;
    let temp_path = temp_path(path);

    let written = File::create(&temp_path)
        .map_err(|source| OutputError::Io {
            operation: "create",
            path: temp_path.clone(),
            source,
        })
        .and_then(|mut file| {
            write(&mut file)?;
            file.sync_all().map_err(|source| OutputError::Io {
                operation: "sync",
                path: temp_path.clone(),
                source,
            })
        });
    if let Err(err) = written {
        let _ = fs::remove_file(&temp_path);
        return Err(err);
    }

    fs::rename(&temp_path, path).map_err(|source| OutputError::AtomicWriteFailed {
        temp_path: temp_path.clone(),
        target_path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), "output written");
    Ok(())
}

fn encode_error(path: &Path, err: &PolarsError) -> OutputError {
    OutputError::Encode {
        path: path.to_path_buf(),
        message: err.to_string(),
    }
}

/// Write `df` as Parquet, replacing any existing file.
pub fn write_parquet(path: &Path, df: &DataFrame) -> Result<()> {
    let mut frame = df.clone();
    write_atomic(path, |file| {
        ParquetWriter::new(file)
            .finish(&mut frame)
            .map_err(|err| encode_error(path, &err))?;
        Ok(())
    })
}

/// Write `df` as comma-separated text with a header row.
pub fn write_csv(path: &Path, df: &DataFrame) -> Result<()> {
    let mut frame = df.clone();
    write_atomic(path, |file| {
        CsvWriter::new(file)
            .include_header(true)
            .finish(&mut frame)
            .map_err(|err| encode_error(path, &err))
    })
}

/// Write `value` as pretty-printed JSON followed by a newline.
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let mut bytes = serde_json::to_vec_pretty(value).map_err(|source| OutputError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    bytes.push(b'\n');
    write_atomic(path, |file| {
        file.write_all(&bytes).map_err(|source| OutputError::Io {
            operation: "write",
            path: path.to_path_buf(),
            source,
        })
    })
}

/// Write the run metadata record.
pub fn write_run_meta(path: &Path, meta: &RunMetadata) -> Result<()> {
    write_json(path, meta)
}
