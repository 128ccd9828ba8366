use axum::Json;
use axum::extract::{Path, State};
use serde::Serialize;
use uuid::Uuid;

use cdss_core::models::{CohortRequest, RgsMode};

use crate::error::ApiError;
use crate::orchestrator;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct RecommendResponse {
    pub message: String,
    pub recommendation_id: Uuid,
    pub patients: usize,
}

/// `POST /recommend` — generate and persist recommendations for the default
/// RGS mode.
pub async fn recommend(
    State(state): State<AppState>,
    Json(request): Json<CohortRequest>,
) -> Result<Json<RecommendResponse>, ApiError> {
    run(state, request, RgsMode::default()).await
}

/// `POST /recommend/{mode}` — same, for an explicit RGS mode.
pub async fn recommend_with_mode(
    State(state): State<AppState>,
    Path(mode): Path<String>,
    Json(request): Json<CohortRequest>,
) -> Result<Json<RecommendResponse>, ApiError> {
    let mode: RgsMode = mode.parse()?;
    run(state, request, mode).await
}

async fn run(
    state: AppState,
    request: CohortRequest,
    mode: RgsMode,
) -> Result<Json<RecommendResponse>, ApiError> {
    let summary = orchestrator::run_recommendation(&state, &request, mode).await?;
    Ok(Json(RecommendResponse {
        message: format!(
            "recommendations generated for {} patient(s)",
            summary.patients
        ),
        recommendation_id: summary.recommendation_id,
        patients: summary.patients,
    }))
}
