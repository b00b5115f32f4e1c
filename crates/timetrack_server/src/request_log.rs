//! Per-request access logging.

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;
use log::{info, warn};
use std::time::Instant;

/// Logs method, path, status and latency for every request.
pub async fn log_requests(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_owned();
    let started_at = Instant::now();

    let response = next.run(request).await;

    let status = response.status();
    let elapsed_ms = started_at.elapsed().as_millis();
    if status.is_server_error() {
        warn!(
            "event=http_request module=server method={method} path={path} status={} duration_ms={elapsed_ms}",
            status.as_u16()
        );
    } else {
        info!(
            "event=http_request module=server method={method} path={path} status={} duration_ms={elapsed_ms}",
            status.as_u16()
        );
    }
    response
}
