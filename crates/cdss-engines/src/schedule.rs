//! Baseline schedule engine: greedy diversity selection over the composite
//! score, then round-robin weekday assignment across the horizon.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use async_trait::async_trait;

use cdss_core::models::{PatientId, ScheduleEntry, ScoredRecord, Weekday};
use cdss_data::reference::SimilarityMatrix;

use crate::ScheduleEngine;
use crate::error::EngineError;

/// How much redundancy against already-picked protocols discounts a
/// candidate's score during selection.
const SIMILARITY_PENALTY: f64 = 0.5;

pub struct DiversityScheduler;

fn rank(records: &mut Vec<&ScoredRecord>) {
    records.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(Ordering::Equal)
            .then(a.protocol_id.cmp(&b.protocol_id))
    });
}

/// Greedy maximal-marginal-relevance pick: each round takes the candidate
/// with the best score after discounting its closest similarity to anything
/// already picked.
fn pick_diverse<'a>(
    mut candidates: Vec<&'a ScoredRecord>,
    similarity: &SimilarityMatrix,
    n: usize,
) -> Vec<&'a ScoredRecord> {
    let mut picked: Vec<&ScoredRecord> = Vec::new();
    while picked.len() < n && !candidates.is_empty() {
        let mut best_index = 0;
        let mut best_value = f64::NEG_INFINITY;
        for (i, candidate) in candidates.iter().enumerate() {
            let redundancy = picked
                .iter()
                .map(|p| similarity.similarity(p.protocol_id, candidate.protocol_id))
                .fold(0.0, f64::max);
            let value = candidate.score - SIMILARITY_PENALTY * redundancy;
            if value > best_value {
                best_value = value;
                best_index = i;
            }
        }
        picked.push(candidates.remove(best_index));
    }
    picked
}

#[async_trait]
impl ScheduleEngine for DiversityScheduler {
    async fn schedule(
        &self,
        patient: PatientId,
        scores: &[ScoredRecord],
        similarity: &SimilarityMatrix,
        n: usize,
        days: usize,
        protocols_per_day: usize,
    ) -> Result<Vec<ScheduleEntry>, EngineError> {
        let mut candidates: Vec<&ScoredRecord> =
            scores.iter().filter(|r| r.patient_id == patient).collect();
        rank(&mut candidates);

        let picked = pick_diverse(candidates, similarity, n);
        if picked.is_empty() {
            return Ok(Vec::new());
        }

        // Fill the horizon day by day, cycling through the picked protocols
        // so the load spreads evenly across the week.
        let mut assigned: Vec<BTreeSet<Weekday>> = vec![BTreeSet::new(); picked.len()];
        let mut slot = 0usize;
        for day in 0..days {
            let weekday = (day % 7) as Weekday;
            for _ in 0..protocols_per_day {
                assigned[slot % picked.len()].insert(weekday);
                slot += 1;
            }
        }

        Ok(picked
            .into_iter()
            .zip(assigned)
            .map(|(record, weekdays)| ScheduleEntry {
                patient_id: record.patient_id,
                protocol_id: record.protocol_id,
                days: weekdays.into_iter().collect(),
                delta_dm: record.delta_dm,
                adherence_recent: record.adherence_recent,
                ppf: record.ppf,
            })
            .collect())
    }
}
