use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DataError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("reference table missing: {path}")]
    ReferenceMissing { path: PathBuf },

    #[error("reference table unreadable: {path}: {source}")]
    ReferenceRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("reference table malformed: {path}: {source}")]
    ReferenceParse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("failed to encode row field: {0}")]
    Encode(#[from] serde_json::Error),
}
