//! Row transformers: expand a patient's schedule into the flat shapes the
//! persistence layer stores.

use jiff::Timestamp;
use uuid::Uuid;

use crate::models::{MetricKey, MetricRow, PrescriptionRow, ScheduleEntry};

/// Expand each schedule entry into one prescription row per assigned
/// weekday. Output order is entry order, then weekday ascending.
pub fn prescription_rows(
    entries: &[ScheduleEntry],
    recommendation_id: Uuid,
    study_ids: &[i64],
    created_at: Timestamp,
) -> Vec<PrescriptionRow> {
    let mut rows = Vec::new();
    for entry in entries {
        let mut weekdays = entry.days.clone();
        weekdays.sort_unstable();
        for weekday in weekdays {
            rows.push(PrescriptionRow {
                patient_id: entry.patient_id,
                protocol_id: entry.protocol_id,
                weekday,
                recommendation_id,
                study_ids: study_ids.to_vec(),
                created_at,
            });
        }
    }
    rows
}

/// Long-form pivot of the tracked metrics: exactly one row per
/// (entry, metric key), three per entry. Pure reshape — nothing is dropped
/// or aggregated.
pub fn metric_rows(
    entries: &[ScheduleEntry],
    recommendation_id: Uuid,
    study_ids: &[i64],
    created_at: Timestamp,
) -> Vec<MetricRow> {
    let mut rows = Vec::new();
    for entry in entries {
        for key in MetricKey::ALL {
            let value = match key {
                MetricKey::DeltaDm => entry.delta_dm,
                MetricKey::AdherenceRecent => entry.adherence_recent,
                MetricKey::Ppf => entry.ppf,
            };
            rows.push(MetricRow {
                patient_id: entry.patient_id,
                protocol_id: entry.protocol_id,
                key,
                value,
                recommendation_id,
                study_ids: study_ids.to_vec(),
                created_at,
            });
        }
    }
    rows
}
