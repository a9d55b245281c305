//! Middleware components for the assetd server.

use std::time::Instant;

use axum::{body::Body, http::Request, middleware::Next, response::Response};

//--------------------------------------------------------------------------------------------------
// Middleware Functions
//--------------------------------------------------------------------------------------------------

/// Log incoming requests and the status they were answered with
pub async fn logging_middleware(req: Request<Body>, next: Next) -> Response {
    let method = req.method().clone();
    let uri = req.uri().clone();
    let started = Instant::now();

    tracing::debug!("Request: {} {}", method, uri);

    let response = next.run(req).await;

    let status = response.status();
    let elapsed_ms = started.elapsed().as_millis();
    if status.is_server_error() {
        tracing::error!("Response: {} {}: {} ({} ms)", method, uri, status, elapsed_ms);
    } else {
        tracing::info!("Response: {} {}: {} ({} ms)", method, uri, status, elapsed_ms);
    }

    response
}
