//! Reference tables shipped as JSON files on configured paths: the protocol
//! attribute table and the protocol similarity matrix. Their presence is
//! part of the health contract.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use cdss_core::models::ProtocolId;

use crate::error::DataError;

/// Per-protocol loadings on the clinical subscales. `loadings` is aligned
/// by index with the table's `subscales`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProtocolAttributes {
    pub protocol_id: ProtocolId,
    pub loadings: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProtocolAttributeTable {
    pub subscales: Vec<String>,
    pub protocols: Vec<ProtocolAttributes>,
}

/// Symmetric protocol-protocol similarity, `matrix[i][j]` for
/// `protocol_ids[i]` against `protocol_ids[j]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarityMatrix {
    pub protocol_ids: Vec<ProtocolId>,
    pub matrix: Vec<Vec<f64>>,
}

impl SimilarityMatrix {
    /// Similarity between two protocols; 0.0 when either is unknown.
    pub fn similarity(&self, a: ProtocolId, b: ProtocolId) -> f64 {
        let ia = self.protocol_ids.iter().position(|&p| p == a);
        let ib = self.protocol_ids.iter().position(|&p| p == b);
        match (ia, ib) {
            (Some(i), Some(j)) => self
                .matrix
                .get(i)
                .and_then(|row| row.get(j))
                .copied()
                .unwrap_or(0.0),
            _ => 0.0,
        }
    }
}

pub fn load_protocol_attributes(path: &Path) -> Result<ProtocolAttributeTable, DataError> {
    load_json(path)
}

pub fn load_similarity(path: &Path) -> Result<SimilarityMatrix, DataError> {
    load_json(path)
}

fn load_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, DataError> {
    if !path.exists() {
        return Err(DataError::ReferenceMissing {
            path: path.to_path_buf(),
        });
    }
    let bytes = fs::read(path).map_err(|source| DataError::ReferenceRead {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_slice(&bytes).map_err(|source| DataError::ReferenceParse {
        path: path.to_path_buf(),
        source,
    })
}
