//! Output error types.

use std::path::PathBuf;

use thiserror::Error;

/// File-level failures while writing outputs.
#[derive(Debug, Error)]
pub enum OutputError {
    /// File system operation failed.
    #[error("failed to {operation} {}", path.display())]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The temporary file could not be renamed over the target.
    #[error("failed to replace {} with {}", target_path.display(), temp_path.display())]
    AtomicWriteFailed {
        temp_path: PathBuf,
        target_path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Encoding the table failed.
    #[error("failed to encode {}: {message}", path.display())]
    Encode { path: PathBuf, message: String },

    /// Serializing JSON failed.
    #[error("failed to serialize {}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Result type for output operations.
pub type Result<T> = std::result::Result<T, OutputError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_error_names_the_path() {
        let err = OutputError::Io {
            operation: "create",
            path: PathBuf::from("out/users.parquet"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert_eq!(err.to_string(), "failed to create out/users.parquet");
        assert!(std::error::Error::source(&err).is_some());
    }
}
