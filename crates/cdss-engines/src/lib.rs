//! cdss-engines
//!
//! The scoring-side collaborator boundary: traits for the scoring adapter,
//! the schedule engine, and the two PPF-computation collaborators, plus
//! baseline implementations of each. The orchestrator is written against
//! the traits; deployments can swap in richer engines without touching it.

pub mod error;
pub mod ppf;
pub mod schedule;
pub mod scoring;

use async_trait::async_trait;

use cdss_core::models::{PatientId, ScheduleEntry, ScoredRecord};
use cdss_data::records::{FitRecord, SessionRecord, SubscaleScore, TimeseriesRecord};
use cdss_data::reference::{ProtocolAttributeTable, SimilarityMatrix};

use crate::error::EngineError;
use crate::ppf::{ProtocolClinicalMap, SubscaleDeficit};

/// Converts raw session, timeseries, and fit data into per-patient-per-
/// protocol suitability records.
///
/// Called once per run with the whole cohort's datasets so normalization
/// can span patients.
#[async_trait]
pub trait ScoringAdapter: Send + Sync {
    async fn score(
        &self,
        sessions: &[SessionRecord],
        timeseries: &[TimeseriesRecord],
        fit: &[FitRecord],
        weights: &[i64],
        alpha: f64,
    ) -> Result<Vec<ScoredRecord>, EngineError>;
}

/// Turns one patient's scored records into a ranked, day-assigned protocol
/// schedule bounded by `n` and shaped by `days` and `protocols_per_day`.
#[async_trait]
pub trait ScheduleEngine: Send + Sync {
    async fn schedule(
        &self,
        patient: PatientId,
        scores: &[ScoredRecord],
        similarity: &SimilarityMatrix,
        n: usize,
        days: usize,
        protocols_per_day: usize,
    ) -> Result<Vec<ScheduleEntry>, EngineError>;
}

/// Derives a patient's per-subscale deficiency from clinical scores.
#[async_trait]
pub trait DeficitEngine: Send + Sync {
    async fn deficiency(&self, scores: &[SubscaleScore]) -> Result<Vec<SubscaleDeficit>, EngineError>;
}

/// Derives the protocol-to-clinical feature mapping from the protocol
/// attribute table.
#[async_trait]
pub trait ProtocolMapper: Send + Sync {
    async fn map(&self, attributes: &ProtocolAttributeTable) -> Result<ProtocolClinicalMap, EngineError>;
}
