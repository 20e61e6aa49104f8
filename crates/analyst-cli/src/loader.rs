//! Report file loading

use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoaderError {
    #[error("file not found: {0}")]
    NotFound(String),

    #[error("failed to read '{path}': {source}")]
    Unreadable {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Read a report file into memory
///
/// A missing file is reported as `NotFound` so the caller can surface a
/// clean message instead of a raw io error.
pub async fn load_report(path: &Path) -> Result<String, LoaderError> {
    tokio::fs::read_to_string(path).await.map_err(|source| {
        let path = path.display().to_string();
        if source.kind() == std::io::ErrorKind::NotFound {
            LoaderError::NotFound(path)
        } else {
            LoaderError::Unreadable { path, source }
        }
    })
}
