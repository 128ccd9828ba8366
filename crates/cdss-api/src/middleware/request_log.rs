use std::time::Instant;

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;

/// Per-request logging: one structured event after the handler finishes,
/// carrying method, path, status, and elapsed time. Server failures log at
/// warn so they stand out even when the error itself was already logged.
pub async fn request_log(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let started = Instant::now();

    let response = next.run(req).await;

    let status = response.status();
    let elapsed_ms = started.elapsed().as_millis() as u64;
    if status.is_server_error() {
        tracing::warn!(%method, path, status = status.as_u16(), elapsed_ms, "request failed");
    } else {
        tracing::info!(%method, path, status = status.as_u16(), elapsed_ms, "request");
    }

    response
}
