use serde::{Deserialize, Serialize};

pub type PatientId = i64;
pub type ProtocolId = i64;

/// Weekday index within the schedule horizon, 0 = Monday .. 6 = Sunday.
pub type Weekday = u8;

/// One (patient, protocol) suitability record produced by the scoring
/// adapter from the combined session, timeseries, and fit datasets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredRecord {
    pub patient_id: PatientId,
    pub protocol_id: ProtocolId,
    pub delta_dm: f64,
    pub adherence_recent: f64,
    pub ppf: f64,
    /// Composite ranking score the adapter derives from the three tracked
    /// metrics and the request weights. Not persisted as a metric.
    pub score: f64,
}

/// A single patient's assignment of one protocol to a set of weekdays,
/// carrying the scored fields the assignment was ranked on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    pub patient_id: PatientId,
    pub protocol_id: ProtocolId,
    pub days: Vec<Weekday>,
    pub delta_dm: f64,
    pub adherence_recent: f64,
    pub ppf: f64,
}
