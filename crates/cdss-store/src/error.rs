use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read PPF table {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write PPF table {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("PPF table {path} is malformed: {source}")]
    Malformed {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("failed to encode PPF table: {0}")]
    Encode(serde_json::Error),
}
