use std::collections::BTreeMap;
use std::path::Path;

use axum::Json;
use axum::extract::State;
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub checks: Checks,
}

#[derive(Debug, Serialize)]
pub struct Checks {
    pub database: &'static str,
    pub files: BTreeMap<&'static str, FileCheck>,
}

#[derive(Debug, Serialize)]
pub struct FileCheck {
    pub path: String,
    pub exists: bool,
}

fn file_check(path: &Path) -> FileCheck {
    FileCheck {
        path: path.display().to_string(),
        exists: path.exists(),
    }
}

/// `GET /health` — composite status of the data-access dependency and the
/// required reference files. Never fails; degradation is reported in the
/// body.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let database = match state.data.ping().await {
        Ok(()) => "ok",
        Err(e) => {
            tracing::warn!(error = %e, "database health probe failed");
            "error"
        }
    };

    let mut files = BTreeMap::new();
    files.insert(
        "protocol_attributes",
        file_check(&state.settings.protocol_attributes_path),
    );
    files.insert(
        "protocol_similarity",
        file_check(&state.settings.protocol_similarity_path),
    );

    let status = if database == "ok" && files.values().all(|f| f.exists) {
        "ok"
    } else {
        "degraded"
    };

    Json(HealthResponse {
        status,
        checks: Checks { database, files },
    })
}

/// `GET /` — liveness stub.
pub async fn root() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}
