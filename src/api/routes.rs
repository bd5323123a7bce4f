//! API Routes
//!
//! Configures the Axum router with all cache endpoints.

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    delete_handler, get_handler, health_handler, keys_handler, pop_handler, set_handler,
    stats_handler, values_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `PUT /set` - Store a key-value pair
/// - `GET /get/:key` - Retrieve a value by key
/// - `DELETE /del/:key` - Delete a key
/// - `POST /pop/:key` - Remove a key and return its value
/// - `GET /keys` - Snapshot of all keys
/// - `GET /values` - Snapshot of all values
/// - `GET /stats` - Get cache statistics
/// - `GET /health` - Health check endpoint
///
/// # Middleware
/// - CORS: Allows any origin
/// - Tracing: Logs all requests
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/set", put(set_handler))
        .route("/get/:key", get(get_handler))
        .route("/del/:key", delete(delete_handler))
        .route("/pop/:key", post(pop_handler))
        .route("/keys", get(keys_handler))
        .route("/values", get(values_handler))
        .route("/stats", get(stats_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::cache::Cache;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use tower::util::ServiceExt;

    fn create_test_app() -> Router {
        create_router(AppState::new(Arc::new(Cache::new())))
    }

    async fn status_of(uri: &str, method: &str) -> StatusCode {
        create_test_app()
            .oneshot(
                Request::builder()
                    .method(method)
                    .uri(uri)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap()
            .status()
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        assert_eq!(status_of("/health", "GET").await, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_stats_endpoint() {
        assert_eq!(status_of("/stats", "GET").await, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_snapshot_endpoints() {
        assert_eq!(status_of("/keys", "GET").await, StatusCode::OK);
        assert_eq!(status_of("/values", "GET").await, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_set_endpoint() {
        let response = create_test_app()
            .oneshot(
                Request::builder()
                    .method("PUT")
                    .uri("/set")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"key":"test","value":"hello"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_missing_key_endpoints() {
        assert_eq!(status_of("/get/nonexistent", "GET").await, StatusCode::NOT_FOUND);
        assert_eq!(status_of("/del/nonexistent", "DELETE").await, StatusCode::NOT_FOUND);
        assert_eq!(status_of("/pop/nonexistent", "POST").await, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_pop_requires_post() {
        assert_eq!(
            status_of("/pop/anything", "GET").await,
            StatusCode::METHOD_NOT_ALLOWED
        );
    }
}
