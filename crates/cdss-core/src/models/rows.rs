use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::schedule::{PatientId, ProtocolId, Weekday};

/// The tracked metric columns persisted for every recommendation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MetricKey {
    #[serde(rename = "DELTA_DM")]
    DeltaDm,
    #[serde(rename = "ADHERENCE_RECENT")]
    AdherenceRecent,
    #[serde(rename = "PPF")]
    Ppf,
}

impl MetricKey {
    pub const ALL: [MetricKey; 3] = [MetricKey::DeltaDm, MetricKey::AdherenceRecent, MetricKey::Ppf];

    pub fn as_str(&self) -> &'static str {
        match self {
            MetricKey::DeltaDm => "DELTA_DM",
            MetricKey::AdherenceRecent => "ADHERENCE_RECENT",
            MetricKey::Ppf => "PPF",
        }
    }
}

/// One staged prescription: a protocol assigned to a patient on one weekday.
/// All rows from the same orchestration run share `recommendation_id` and
/// `created_at`, correlating the batch for later review or rollback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrescriptionRow {
    pub patient_id: PatientId,
    pub protocol_id: ProtocolId,
    pub weekday: Weekday,
    pub recommendation_id: Uuid,
    pub study_ids: Vec<i64>,
    pub created_at: Timestamp,
}

/// One long-form metric observation for a recommended (patient, protocol).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricRow {
    pub patient_id: PatientId,
    pub protocol_id: ProtocolId,
    pub key: MetricKey,
    pub value: f64,
    pub recommendation_id: Uuid,
    pub study_ids: Vec<i64>,
    pub created_at: Timestamp,
}
