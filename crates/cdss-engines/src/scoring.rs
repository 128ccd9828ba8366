//! Baseline scoring adapter: recency-weighted adherence, mean difficulty
//! progression, and prior fit, combined into a weighted composite after
//! cross-patient min-max normalization.

use std::collections::{BTreeMap, BTreeSet};

use async_trait::async_trait;

use cdss_core::models::{PatientId, ProtocolId, ScoredRecord};
use cdss_data::records::{FitRecord, SessionRecord, TimeseriesRecord};

use crate::ScoringAdapter;
use crate::error::EngineError;

const METRIC_COUNT: usize = 3;

pub struct WeightedScoring;

type Key = (PatientId, ProtocolId);

impl WeightedScoring {
    /// Exponentially weighted recent adherence per (patient, protocol),
    /// walked in session order. `alpha` is the recency factor: 1.0 keeps
    /// only the latest session, 0.0 only the first.
    fn recent_adherence(sessions: &[SessionRecord], alpha: f64) -> BTreeMap<Key, f64> {
        let mut by_key: BTreeMap<Key, Vec<(i64, f64)>> = BTreeMap::new();
        for s in sessions {
            by_key
                .entry((s.patient_id, s.protocol_id))
                .or_default()
                .push((s.session_index, s.adherence));
        }

        by_key
            .into_iter()
            .map(|(key, mut points)| {
                points.sort_by_key(|(index, _)| *index);
                let mut iter = points.into_iter().map(|(_, a)| a);
                let mut acc = iter.next().unwrap_or(0.0);
                for a in iter {
                    acc = alpha * a + (1.0 - alpha) * acc;
                }
                (key, acc)
            })
            .collect()
    }

    /// Mean difficulty-modulator delta per (patient, protocol); 0.0 when
    /// the series is too short to have a delta.
    fn delta_dm(timeseries: &[TimeseriesRecord]) -> BTreeMap<Key, f64> {
        let mut by_key: BTreeMap<Key, Vec<(i64, f64)>> = BTreeMap::new();
        for t in timeseries {
            by_key
                .entry((t.patient_id, t.protocol_id))
                .or_default()
                .push((t.session_index, t.dm_value));
        }

        by_key
            .into_iter()
            .map(|(key, mut points)| {
                points.sort_by_key(|(index, _)| *index);
                let values: Vec<f64> = points.into_iter().map(|(_, v)| v).collect();
                let delta = if values.len() < 2 {
                    0.0
                } else {
                    values.windows(2).map(|w| w[1] - w[0]).sum::<f64>() / (values.len() - 1) as f64
                };
                (key, delta)
            })
            .collect()
    }
}

/// Min-max normalize in place; a degenerate spread maps everything to 0.5.
fn normalize(values: &mut [f64]) {
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let spread = max - min;
    for v in values.iter_mut() {
        *v = if spread > 0.0 { (*v - min) / spread } else { 0.5 };
    }
}

#[async_trait]
impl ScoringAdapter for WeightedScoring {
    async fn score(
        &self,
        sessions: &[SessionRecord],
        timeseries: &[TimeseriesRecord],
        fit: &[FitRecord],
        weights: &[i64],
        alpha: f64,
    ) -> Result<Vec<ScoredRecord>, EngineError> {
        if weights.len() != METRIC_COUNT {
            return Err(EngineError::WeightCount {
                expected: METRIC_COUNT,
                got: weights.len(),
            });
        }

        let adherence = Self::recent_adherence(sessions, alpha);
        let delta = Self::delta_dm(timeseries);
        let ppf: BTreeMap<Key, f64> = fit
            .iter()
            .map(|f| ((f.patient_id, f.protocol_id), f.ppf))
            .collect();

        let keys: BTreeSet<Key> = adherence
            .keys()
            .chain(delta.keys())
            .chain(ppf.keys())
            .copied()
            .collect();

        let mut records: Vec<ScoredRecord> = keys
            .into_iter()
            .map(|(patient_id, protocol_id)| ScoredRecord {
                patient_id,
                protocol_id,
                delta_dm: delta.get(&(patient_id, protocol_id)).copied().unwrap_or(0.0),
                adherence_recent: adherence
                    .get(&(patient_id, protocol_id))
                    .copied()
                    .unwrap_or(0.0),
                ppf: ppf.get(&(patient_id, protocol_id)).copied().unwrap_or(0.0),
                score: 0.0,
            })
            .collect();

        // Composite over batch-normalized metrics so one patient's scale
        // does not dominate another's.
        let mut delta_col: Vec<f64> = records.iter().map(|r| r.delta_dm).collect();
        let mut adherence_col: Vec<f64> = records.iter().map(|r| r.adherence_recent).collect();
        let mut ppf_col: Vec<f64> = records.iter().map(|r| r.ppf).collect();
        normalize(&mut delta_col);
        normalize(&mut adherence_col);
        normalize(&mut ppf_col);

        let total_weight: f64 = weights.iter().map(|&w| w as f64).sum();
        for (i, record) in records.iter_mut().enumerate() {
            record.score = (weights[0] as f64 * delta_col[i]
                + weights[1] as f64 * adherence_col[i]
                + weights[2] as f64 * ppf_col[i])
                / total_weight;
        }

        tracing::debug!(records = records.len(), "scoring batch complete");
        Ok(records)
    }
}
