//! cdss-data
//!
//! The data-access boundary of the CDSS: the [`DataAccess`] trait the
//! orchestrator is written against, its record DTOs, the reference tables
//! loaded from configured files, and the SQLite-backed production
//! implementation.

pub mod error;
pub mod records;
pub mod reference;
pub mod schema;
pub mod sqlite;

use async_trait::async_trait;

use cdss_core::models::{MetricRow, PatientId, PrescriptionRow, RgsMode};

use crate::error::DataError;
use crate::records::{FitRecord, SessionRecord, SubscaleScore, TimeseriesRecord};
use crate::reference::{ProtocolAttributeTable, SimilarityMatrix};

/// Access to the relational system of record and the reference tables.
///
/// One handle is built at startup and shared by every in-flight request, so
/// implementations must be safe for concurrent use.
#[async_trait]
pub trait DataAccess: Send + Sync {
    /// Lightweight connectivity probe for the health endpoint.
    async fn ping(&self) -> Result<(), DataError>;

    /// Resolve studies to their patients, deduplicated, in first-seen order.
    async fn fetch_patients_by_study(&self, study_ids: &[i64]) -> Result<Vec<PatientId>, DataError>;

    async fn load_session_data(
        &self,
        patients: &[PatientId],
        mode: RgsMode,
    ) -> Result<Vec<SessionRecord>, DataError>;

    async fn load_timeseries_data(
        &self,
        patients: &[PatientId],
        mode: RgsMode,
    ) -> Result<Vec<TimeseriesRecord>, DataError>;

    /// Previously computed patient-protocol-fit values.
    async fn load_ppf_data(&self, patients: &[PatientId]) -> Result<Vec<FitRecord>, DataError>;

    async fn load_protocol_similarity(&self) -> Result<SimilarityMatrix, DataError>;

    /// Clinical subscale scores for one patient. Empty when the patient has
    /// no assessment on file.
    async fn load_clinical_scores(
        &self,
        patient: PatientId,
    ) -> Result<Vec<SubscaleScore>, DataError>;

    async fn load_protocol_attributes(&self) -> Result<ProtocolAttributeTable, DataError>;

    async fn write_prescriptions(&self, rows: &[PrescriptionRow]) -> Result<(), DataError>;

    async fn write_metrics(&self, rows: &[MetricRow]) -> Result<(), DataError>;
}
