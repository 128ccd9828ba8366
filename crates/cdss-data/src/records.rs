//! Record DTOs returned by the data-access layer. The upstream relational
//! schema is private to the implementation; these are the shapes the
//! scoring side consumes.

use serde::{Deserialize, Serialize};

use cdss_core::models::{PatientId, ProtocolId};

/// One completed rehabilitation session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub patient_id: PatientId,
    pub protocol_id: ProtocolId,
    pub session_index: i64,
    /// Fraction of the prescribed session actually performed, in [0, 1].
    pub adherence: f64,
}

/// One difficulty-modulator observation within a session series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeseriesRecord {
    pub patient_id: PatientId,
    pub protocol_id: ProtocolId,
    pub session_index: i64,
    pub dm_value: f64,
}

/// A previously computed patient-protocol-fit value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitRecord {
    pub patient_id: PatientId,
    pub protocol_id: ProtocolId,
    pub ppf: f64,
}

/// One clinical subscale score from a patient's assessment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubscaleScore {
    pub subscale: String,
    pub value: f64,
    /// Upper bound of the subscale's range, used to normalize deficiency.
    pub max_value: f64,
}
