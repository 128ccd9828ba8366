//! cdss-api
//!
//! The HTTP surface of the CDSS: request handlers, the orchestration
//! pipeline behind them, and the error-to-status mapping.

pub mod config;
pub mod error;
pub mod middleware;
pub mod orchestrator;
pub mod routes;
pub mod state;

use axum::Router;
use axum::middleware as axum_mw;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};

use crate::state::AppState;

/// Build the application router over a fully constructed state.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(routes::health::root))
        .route("/health", get(routes::health::health))
        .route("/recommend", post(routes::recommend::recommend))
        .route("/recommend/{mode}", post(routes::recommend::recommend_with_mode))
        .route(
            "/compute_metrics/{patient_id}",
            post(routes::metrics::compute_metrics),
        )
        .layer(axum_mw::from_fn(middleware::request_log::request_log))
        .layer(cors)
        .with_state(state)
}
