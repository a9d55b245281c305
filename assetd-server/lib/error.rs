//! Error handling for the assetd server.
//!
//! Every error a handler returns is turned into a status code and a generic JSON body.
//! Internal details, including filesystem paths, are logged and never sent to the client.

use assetd_core::store::StoreError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::payload::ErrorResponse;

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// The result of a request handler.
pub type ServerResult<T> = Result<T, ServerError>;

/// An error that ends a single request. It never takes the server down.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The requested resource does not exist.
    #[error("resource not found")]
    NotFound,

    /// The request targets something it may not access.
    #[error("access forbidden")]
    Forbidden,

    /// Something failed on the server side. The detail is for logs only.
    #[error("internal error: {0}")]
    InternalError(String),
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl ServerError {
    /// The status code sent for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServerError::NotFound => StatusCode::NOT_FOUND,
            ServerError::Forbidden => StatusCode::FORBIDDEN,
            ServerError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The machine-readable code sent for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            ServerError::NotFound => "NOT_FOUND",
            ServerError::Forbidden => "FORBIDDEN",
            ServerError::InternalError(_) => "INTERNAL_ERROR",
        }
    }

    fn public_message(&self) -> &'static str {
        match self {
            ServerError::NotFound => "Resource not found",
            ServerError::Forbidden => "Access forbidden",
            ServerError::InternalError(_) => "Internal server error",
        }
    }
}

//--------------------------------------------------------------------------------------------------
// Trait Implementations
//--------------------------------------------------------------------------------------------------

impl From<StoreError> for ServerError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::NotFound(_) => ServerError::NotFound,
            StoreError::Forbidden(_) => ServerError::Forbidden,
            error @ StoreError::Io { .. } => {
                tracing::error!("{}", error);
                ServerError::InternalError(error.to_string())
            }
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let body = ErrorResponse::new(self.public_message(), self.error_code());
        (self.status_code(), Json(body)).into_response()
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_store_errors_map_to_statuses_without_details() {
        let cases = [
            (
                StoreError::NotFound("a/b.png".to_string()),
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
            ),
            (
                StoreError::Forbidden("../../etc/passwd".to_string()),
                StatusCode::FORBIDDEN,
                "FORBIDDEN",
            ),
            (
                StoreError::Io {
                    path: "a/b.png".to_string(),
                    source: std::io::Error::other("/srv/static/a/b.png: input/output error"),
                },
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
            ),
        ];

        for (store_error, status, code) in cases {
            let response = ServerError::from(store_error).into_response();
            assert_eq!(response.status(), status);

            let body = axum::body::to_bytes(response.into_body(), usize::MAX)
                .await
                .unwrap();
            let body: ErrorResponse = serde_json::from_slice(&body).unwrap();
            assert!(!body.success);
            assert_eq!(body.error_code, code);
            assert!(!body.message.contains('/'));
            assert_eq!(body.message_ar, body.message);
        }
    }
}
