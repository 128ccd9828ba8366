//! The orchestration pipeline behind the two write endpoints.
//!
//! Failure policy for the per-patient recommendation loop: abort on the
//! first failing patient. Rows already written for earlier patients remain
//! (they share the run's recommendation id, so they can be identified and
//! rolled back), and no further patients are processed.

use jiff::Timestamp;
use tracing::debug;
use uuid::Uuid;

use cdss_core::models::{CohortRequest, PatientId, RgsMode};
use cdss_core::transform;
use cdss_data::error::DataError;
use cdss_engines::ppf::merge_ppf;

use crate::error::ApiError;
use crate::state::AppState;

/// Outcome of one recommendation run, echoed in the 200 body.
#[derive(Debug)]
pub struct RecommendationSummary {
    pub recommendation_id: Uuid,
    pub patients: usize,
}

/// Outcome of one PPF computation, echoed in the 200 body.
#[derive(Debug)]
pub struct PpfSummary {
    pub subscales_used: Vec<String>,
    pub rows: usize,
}

pub async fn run_recommendation(
    state: &AppState,
    request: &CohortRequest,
    mode: RgsMode,
) -> Result<RecommendationSummary, ApiError> {
    request.validate()?;
    let params = state.settings.resolve(request);

    let patients = state.data.fetch_patients_by_study(&request.study_id).await?;
    debug!(
        count = patients.len(),
        study_ids = ?request.study_id,
        mode = mode.as_str(),
        "resolved cohort"
    );
    if patients.is_empty() {
        return Err(ApiError::NotFound(format!(
            "no patients found for studies {:?}",
            request.study_id
        )));
    }

    let sessions = state.data.load_session_data(&patients, mode).await?;
    let timeseries = state.data.load_timeseries_data(&patients, mode).await?;
    let fit = state.data.load_ppf_data(&patients).await?;
    let similarity = state.data.load_protocol_similarity().await?;

    // One batched scoring call across the cohort, so normalization can span
    // patients.
    let scores = state
        .scoring
        .score(&sessions, &timeseries, &fit, &params.weights, params.alpha)
        .await?;

    // Minted once; every row of this run carries them.
    let recommendation_id = Uuid::new_v4();
    let created_at = Timestamp::now();

    for &patient in &patients {
        let entries = state
            .scheduler
            .schedule(
                patient,
                &scores,
                &similarity,
                params.n,
                params.days,
                params.protocols_per_day,
            )
            .await?;

        let prescriptions =
            transform::prescription_rows(&entries, recommendation_id, &request.study_id, created_at);
        let metrics =
            transform::metric_rows(&entries, recommendation_id, &request.study_id, created_at);

        state.data.write_prescriptions(&prescriptions).await?;
        state.data.write_metrics(&metrics).await?;
        debug!(
            patient,
            prescriptions = prescriptions.len(),
            metrics = metrics.len(),
            "patient processed"
        );
    }

    Ok(RecommendationSummary {
        recommendation_id,
        patients: patients.len(),
    })
}

pub async fn run_ppf_computation(
    state: &AppState,
    patient: PatientId,
) -> Result<PpfSummary, ApiError> {
    let scores = state.data.load_clinical_scores(patient).await?;
    if scores.is_empty() {
        return Err(ApiError::NotFound(format!(
            "no clinical subscale scores for patient {patient}"
        )));
    }

    let attributes = state
        .data
        .load_protocol_attributes()
        .await
        .map_err(|e| match e {
            DataError::ReferenceMissing { .. } => ApiError::NotFound(e.to_string()),
            other => other.into(),
        })?;

    let deficits = state.deficit.deficiency(&scores).await?;
    let map = state.mapper.map(&attributes).await?;

    let table = merge_ppf(patient, &deficits, &map);
    let subscales_used = table.subscale_columns.clone();
    let rows = table.rows.len();

    // Serialize upserts: the store's read-modify-write must not interleave.
    let store = state.ppf_store.lock().await;
    store.upsert(table)?;

    Ok(PpfSummary {
        subscales_used,
        rows,
    })
}
