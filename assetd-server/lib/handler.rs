//! Request handlers for the assetd server.
//!
//! The static handlers serve files from the asset store. The API handlers form the small
//! default API that stands in for the external business API when none is mounted.

use axum::{
    body::Body,
    extract::{rejection::PathRejection, Path, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};

use crate::{error::ServerError, payload::RegularMessageResponse, state::AppState, ServerResult};

//--------------------------------------------------------------------------------------------------
// Functions: Static Handlers
//--------------------------------------------------------------------------------------------------

/// Handler for `GET /static/{*path}`
///
/// Streams the file so a slow client only holds its own file handle. The stream is dropped,
/// and the file closed, as soon as the client goes away.
pub async fn static_asset(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
) -> ServerResult<Response> {
    // Asset names are UTF-8, so a path that does not decode names no asset.
    let Path(path) = path.map_err(|e| {
        tracing::debug!("undecodable asset path: {}", e);
        ServerError::NotFound
    })?;

    let asset = state.get_store().get(&path).await?;
    let content_type = asset.content_type();
    let len = asset.len();

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type)
        .header(header::CONTENT_LENGTH, len)
        .header(header::X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff"))
        .body(Body::from_stream(asset.into_stream()))
        .map_err(|e| ServerError::InternalError(format!("failed to build response: {}", e)))
}

/// Handler for the bare prefix, with or without a trailing slash, which names no asset
pub async fn static_index() -> ServerResult<Response> {
    Err(ServerError::NotFound)
}

//--------------------------------------------------------------------------------------------------
// Functions: API Handlers
//--------------------------------------------------------------------------------------------------

/// Handler for health check
pub async fn health() -> ServerResult<impl IntoResponse> {
    Ok((
        StatusCode::OK,
        Json(RegularMessageResponse {
            message: "Service is healthy".to_string(),
        }),
    ))
}

/// Fallback for paths the API does not know
pub async fn api_fallback() -> ServerResult<Response> {
    Err(ServerError::NotFound)
}
