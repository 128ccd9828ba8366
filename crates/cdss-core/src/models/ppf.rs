use serde::{Deserialize, Serialize};

use super::schedule::{PatientId, ProtocolId};

/// One patient-protocol-fit row. `contributions` is aligned by index with
/// the owning table's `subscale_columns`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PpfRecord {
    pub patient_id: PatientId,
    pub protocol_id: ProtocolId,
    pub ppf: f64,
    pub contributions: Vec<f64>,
}

impl PpfRecord {
    pub fn key(&self) -> (PatientId, ProtocolId) {
        (self.patient_id, self.protocol_id)
    }
}

/// The durable PPF table: rows unique on (patient_id, protocol_id), with the
/// active contribution column set carried as table-level metadata rather
/// than repeated per row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PpfTable {
    pub subscale_columns: Vec<String>,
    pub rows: Vec<PpfRecord>,
}
