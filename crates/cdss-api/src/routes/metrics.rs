use axum::Json;
use axum::extract::{Path, State};
use serde::Serialize;

use cdss_core::models::PatientId;

use crate::error::ApiError;
use crate::orchestrator;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ComputeMetricsResponse {
    pub message: String,
    pub patient_id: PatientId,
    pub subscales_used: Vec<String>,
}

/// `POST /compute_metrics/{patient_id}` — compute the patient's fit against
/// every protocol and merge the result into the PPF store.
pub async fn compute_metrics(
    State(state): State<AppState>,
    Path(patient_id): Path<PatientId>,
) -> Result<Json<ComputeMetricsResponse>, ApiError> {
    let summary = orchestrator::run_ppf_computation(&state, patient_id).await?;
    Ok(Json(ComputeMetricsResponse {
        message: format!("PPF computed for {} protocol(s)", summary.rows),
        patient_id,
        subscales_used: summary.subscales_used,
    }))
}
