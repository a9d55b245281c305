//! Router configuration for the assetd server.
//!
//! Requests under the public prefix go to the asset store. Everything else is handed to the
//! API router untouched.

use axum::{middleware, routing::get, Router};

use crate::{handler, middleware as app_middleware, state::AppState};

//--------------------------------------------------------------------------------------------------
// Functions
//--------------------------------------------------------------------------------------------------

/// Create a new router serving static assets and delegating all other paths to `api`
pub fn create_router(state: AppState, api: Router) -> Router {
    let prefix = state.get_config().get_public_prefix();

    Router::new()
        .route(prefix, get(handler::static_index))
        .route(&format!("{prefix}/"), get(handler::static_index))
        .route(&format!("{prefix}/{{*path}}"), get(handler::static_asset))
        .with_state(state)
        .fallback_service(api)
        .layer(middleware::from_fn(app_middleware::logging_middleware))
}

/// Create the API router used when no external API is mounted
pub fn default_api_router() -> Router {
    let rest_api = Router::new().route("/health", get(handler::health));

    Router::new()
        .nest("/api/v1", rest_api)
        .fallback(handler::api_fallback)
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use assetd_core::config::{Config, ConfigSource};
    use assetd_utils::{PORT_ENV_VAR, STATIC_ROOT_ENV_VAR};
    use axum::{
        body::{to_bytes, Body},
        http::{header, Method, Request, StatusCode},
        response::Response,
    };
    use tempfile::TempDir;
    use tower::ServiceExt;

    use super::*;
    use crate::payload::ErrorResponse;

    struct Fixture {
        _dir: TempDir,
        png: Vec<u8>,
        router: Router,
    }

    fn fixture_with_api(api: Router) -> Fixture {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("static");
        std::fs::create_dir_all(root.join("profile_images")).unwrap();
        std::fs::create_dir_all(root.join("manual_guides")).unwrap();

        let png: Vec<u8> = (0..10240u32).map(|i| (i * 7 % 256) as u8).collect();
        std::fs::write(root.join("profile_images/29.png"), &png).unwrap();
        std::fs::write(root.join("manual_guides/guide v1.pdf"), b"%PDF-1.7").unwrap();
        std::fs::write(dir.path().join("passwd"), b"root:x:0:0:root:/root:/bin/bash").unwrap();

        let config = Config::from_vars(
            ConfigSource::Process,
            vec![
                (STATIC_ROOT_ENV_VAR.to_string(), root.display().to_string()),
                (PORT_ENV_VAR.to_string(), "8000".to_string()),
            ],
        )
        .unwrap();

        let router = create_router(AppState::new(Arc::new(config)), api);
        Fixture {
            _dir: dir,
            png,
            router,
        }
    }

    fn fixture() -> Fixture {
        fixture_with_api(default_api_router())
    }

    async fn send(router: &Router, method: Method, uri: &str) -> Response {
        router
            .clone()
            .oneshot(
                Request::builder()
                    .method(method)
                    .uri(uri)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap()
    }

    async fn body_bytes(response: Response) -> Vec<u8> {
        to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap()
            .to_vec()
    }

    #[tokio::test]
    async fn test_serves_asset_with_content_type_and_length() {
        let f = fixture();
        let response = send(&f.router, Method::GET, "/static/profile_images/29.png").await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "image/png");
        assert_eq!(response.headers()[header::CONTENT_LENGTH], "10240");

        let body = body_bytes(response).await;
        assert_eq!(body.len(), 10240);
        assert_eq!(body, f.png);
    }

    #[tokio::test]
    async fn test_serves_percent_encoded_names() {
        let f = fixture();
        let response = send(&f.router, Method::GET, "/static/manual_guides/guide%20v1.pdf").await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/pdf");
        assert_eq!(body_bytes(response).await, b"%PDF-1.7");
    }

    #[tokio::test]
    async fn test_head_returns_headers_only() {
        let f = fixture();
        let response = send(&f.router, Method::HEAD, "/static/profile_images/29.png").await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_LENGTH], "10240");
        assert!(body_bytes(response).await.is_empty());
    }

    #[tokio::test]
    async fn test_traversal_is_forbidden_without_leaking_content() {
        let f = fixture();
        for uri in [
            "/static/../../etc/passwd",
            "/static/../passwd",
            "/static/%2e%2e/passwd",
            "/static/profile_images/..%2F..%2Fpasswd",
        ] {
            let response = send(&f.router, Method::GET, uri).await;
            assert_eq!(response.status(), StatusCode::FORBIDDEN, "{uri}");

            let body = body_bytes(response).await;
            assert!(!String::from_utf8_lossy(&body).contains("root:"));
            let body: ErrorResponse = serde_json::from_slice(&body).unwrap();
            assert_eq!(body.error_code, "FORBIDDEN");
        }
    }

    #[tokio::test]
    async fn test_missing_asset_is_not_found() {
        let f = fixture();
        for uri in [
            "/static/profile_images/30.png",
            "/static/profile_images",
            "/static",
        ] {
            let response = send(&f.router, Method::GET, uri).await;
            assert_eq!(response.status(), StatusCode::NOT_FOUND, "{uri}");

            let body: ErrorResponse = serde_json::from_slice(&body_bytes(response).await).unwrap();
            assert_eq!(body.error_code, "NOT_FOUND");
            assert!(!body.message.contains("profile_images"));
        }
    }

    #[tokio::test]
    async fn test_prefix_with_trailing_slash_stays_with_static_handler() {
        let api = Router::new().fallback(|| async { "api" });
        let f = fixture_with_api(api);

        for uri in ["/static", "/static/"] {
            let response = send(&f.router, Method::GET, uri).await;
            assert_eq!(response.status(), StatusCode::NOT_FOUND, "{uri}");

            let body: ErrorResponse = serde_json::from_slice(&body_bytes(response).await).unwrap();
            assert_eq!(body.error_code, "NOT_FOUND");
        }

        let response = send(&f.router, Method::GET, "/other").await;
        assert_eq!(body_bytes(response).await, b"api");
    }

    #[tokio::test]
    async fn test_undecodable_path_is_not_found_envelope() {
        let f = fixture();
        for uri in ["/static/%FF.png", "/static/profile_images/%C3%28.png"] {
            let response = send(&f.router, Method::GET, uri).await;
            assert_eq!(response.status(), StatusCode::NOT_FOUND, "{uri}");
            assert_eq!(response.headers()[header::CONTENT_TYPE], "application/json");

            let body: ErrorResponse = serde_json::from_slice(&body_bytes(response).await).unwrap();
            assert_eq!(body.error_code, "NOT_FOUND");
        }
    }

    #[tokio::test]
    async fn test_other_methods_are_not_allowed() {
        let f = fixture();
        let response = send(&f.router, Method::POST, "/static/profile_images/29.png").await;
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn test_non_static_paths_go_to_default_api() {
        let f = fixture();

        let response = send(&f.router, Method::GET, "/api/v1/health").await;
        assert_eq!(response.status(), StatusCode::OK);

        let response = send(&f.router, Method::GET, "/staticfiles/profile_images/29.png").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_non_static_paths_reach_custom_api_unchanged() {
        let api = Router::new().route(
            "/users/{id}",
            get(|axum::extract::Path(id): axum::extract::Path<String>| async move {
                format!("user {id}")
            }),
        );
        let f = fixture_with_api(api);

        let response = send(&f.router, Method::GET, "/users/29").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_bytes(response).await, b"user 29");

        let response = send(&f.router, Method::GET, "/static/profile_images/29.png").await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_concurrent_requests_are_byte_identical() {
        let f = fixture();
        let requests = (0..16).map(|_| {
            let router = f.router.clone();
            async move { body_bytes(send(&router, Method::GET, "/static/profile_images/29.png").await).await }
        });

        for body in futures::future::join_all(requests).await {
            assert_eq!(body, f.png);
        }
    }
}
