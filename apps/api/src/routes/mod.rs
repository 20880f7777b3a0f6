pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    http::{
        header::{ACCESS_CONTROL_ALLOW_ORIGIN, CONTENT_TYPE},
        HeaderName, HeaderValue, Method,
    },
    middleware,
    response::Response,
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};

use crate::chat::handlers::{
    handle_chat, handle_chat_method_not_allowed, handle_chat_preflight, API_KEY_HEADER,
};
use crate::projects::handlers::{handle_get_project, handle_list_projects, handle_upsert_project};
use crate::state::AppState;
use crate::usage::handlers::{handle_recent_usage, handle_stats};

/// `/chat` answers its own preflight, so it sits outside the `CorsLayer`.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, HeaderName::from_static(API_KEY_HEADER)]);

    let chat = Router::new()
        .route(
            "/chat",
            post(handle_chat)
                .options(handle_chat_preflight)
                .fallback(handle_chat_method_not_allowed),
        )
        .layer(middleware::map_response(allow_any_origin));

    let api = Router::new()
        .route("/health", get(health::health_handler))
        .route(
            "/projects",
            get(handle_list_projects).post(handle_upsert_project),
        )
        .route("/projects/:id", get(handle_get_project))
        .route("/stats", get(handle_stats))
        .route("/usage", get(handle_recent_usage))
        .layer(cors);

    chat.merge(api)
        .layer(DefaultBodyLimit::max(state.config.body_limit_bytes))
        .with_state(state)
}

async fn allow_any_origin(mut response: Response) -> Response {
    response
        .headers_mut()
        .insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    response
}

#[cfg(test)]
mod tests {
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::config::Config;

    fn router() -> Router {
        build_router(AppState::new(Config::for_tests(), None, None))
    }

    #[tokio::test]
    async fn test_persistence_routes_are_unavailable_without_database() {
        for uri in [
            "/stats",
            "/usage",
            "/projects",
            "/projects/7f1d2c3a-0000-4000-8000-000000000000",
        ] {
            let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
            let response = router().oneshot(request).await.unwrap();
            assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE, "for {uri}");
        }
    }

    #[tokio::test]
    async fn test_project_fields_are_validated_before_persistence() {
        let request = Request::builder()
            .method(Method::POST)
            .uri("/projects")
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(json!({"name": "blog"}).to_string()))
            .unwrap();
        let response = router().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"], "Missing required fields: name, path, settings_module");
    }

    async fn send_json(request: Request<Body>) -> (StatusCode, Value) {
        let response = router().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_malformed_project_json_is_json_error() {
        let request = Request::builder()
            .method(Method::POST)
            .uri("/projects")
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let (status, body) = send_json(request).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn test_bad_project_id_is_json_error() {
        let request = Request::builder()
            .uri("/projects/not-a-uuid")
            .body(Body::empty())
            .unwrap();
        let (status, body) = send_json(request).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn test_other_routes_keep_cors_preflight() {
        let request = Request::builder()
            .method(Method::OPTIONS)
            .uri("/projects")
            .header("origin", "http://localhost:3000")
            .header("access-control-request-method", "POST")
            .body(Body::empty())
            .unwrap();
        let response = router().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    }
}
