//! API routing: the password-oracle façade lives under a configurable URL
//! prefix; `/health` and the OpenAPI/Swagger surface are always rooted.

use super::{handlers, middleware};
use crate::state::AppState;
use axum::{middleware as axum_middleware, routing::get, routing::post, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health,
        handlers::get_config,
        handlers::get_command,
        handlers::add_password,
    ),
    components(schemas(
        handlers::HealthResponse,
        handlers::AllResponse,
        handlers::AddForm,
        crate::config::OracleConfig,
    )),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "config", description = "Configuration endpoints"),
        (name = "oracle", description = "Password quality oracle: availability and entropy"),
    ),
    info(
        title = "Password Quality Oracle",
        version = "0.1.0",
        description = "Recent-password throttling and n-gram entropy scoring",
    )
)]
pub struct ApiDoc;

/// Builds the full router: façade routes nested under `config.path`, plus
/// `/health`, `/api/v1/config`, and the Swagger UI at `/swagger-ui`.
pub fn create_router(state: AppState) -> Router {
    let prefix = state.config.normalized_path();
    let command_path = format!("{prefix}:command");
    let add_path = format!("{prefix}add");

    let openapi = ApiDoc::openapi();

    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/v1/config", get(handlers::get_config))
        .route(&command_path, get(handlers::get_command))
        .route(&add_path, post(handlers::add_password))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi))
        .with_state(state)
        .layer(axum_middleware::from_fn(middleware::request_id_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OracleConfig;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use oracle_core::{DeprecatingSketch, Oracle};
    use tower::ServiceExt;

    fn test_state() -> AppState {
        let sketch = DeprecatingSketch::new(1000, 2, 1).unwrap();
        let oracle = Oracle::new(sketch, None, crate::state::NGRAM_LEN);
        AppState::new(oracle, OracleConfig::default())
    }

    #[tokio::test]
    async fn s5_add_then_available_then_unknown_prefix_then_entropy_without_model() {
        let app = create_router(test_state());

        let response = app
            .clone()
            .oneshot(
                Request::post("/add")
                    .header("content-type", "application/x-www-form-urlencoded")
                    .body(Body::from("password=secret"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let response = app
            .clone()
            .oneshot(Request::get("/available.json?password=secret").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"false");

        let response = app
            .clone()
            .oneshot(Request::get("/no-such-prefix/available.json?password=secret").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = app
            .oneshot(Request::get("/entropy.json?password=secret").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn unknown_format_is_415() {
        let app = create_router(test_state());
        let response = app
            .oneshot(Request::get("/available.xml?password=secret").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    }

    #[tokio::test]
    async fn missing_password_is_404() {
        let app = create_router(test_state());
        let response =
            app.oneshot(Request::get("/available.json").body(Body::empty()).unwrap()).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
