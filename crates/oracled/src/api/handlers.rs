//! Request handlers for the password-quality-oracle façade (spec.md §6).

use crate::state::AppState;
use axum::extract::{Form, Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use utoipa::ToSchema;

/// Health check response.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
}

/// Combined `available` + `entropy` result (spec.md §4.5 `all`).
#[derive(Debug, Serialize, ToSchema)]
pub struct AllResponse {
    pub entropy: Option<f64>,
    pub available: bool,
}

impl From<oracle_core::Verdict> for AllResponse {
    fn from(v: oracle_core::Verdict) -> Self {
        Self { entropy: v.entropy, available: v.available }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AddForm {
    pub password: String,
}

/// Health check endpoint.
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is healthy", body = HealthResponse)),
    tag = "health"
)]
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.started_at.elapsed().as_secs(),
    })
}

/// Daemon configuration (read-only).
#[utoipa::path(
    get,
    path = "/api/v1/config",
    responses((status = 200, description = "Configuration retrieved", body = crate::config::OracleConfig)),
    tag = "config"
)]
pub async fn get_config(State(state): State<AppState>) -> Json<crate::config::OracleConfig> {
    Json((*state.config).clone())
}

/// Dispatches `{prefix}{command}.{fmt}?password=<p>` to `available`,
/// `entropy`, or `all` (spec.md §6). Only `json` is a supported format.
#[utoipa::path(
    get,
    path = "/{command}",
    params(
        ("command" = String, Path, description = "`<function>.<format>`, e.g. `available.json`"),
        ("password" = String, Query, description = "Candidate password")
    ),
    responses(
        (status = 200, description = "Result for `available` (bool), `entropy` (float), or `all` ({entropy, available})"),
        (status = 404, description = "Missing password or unknown command"),
        (status = 415, description = "Unknown format"),
        (status = 503, description = "No language model loaded")
    ),
    tag = "oracle"
)]
pub async fn get_command(
    State(state): State<AppState>,
    Path(command): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let password = match params.get("password").filter(|p| !p.is_empty()) {
        Some(p) => p,
        None => return (StatusCode::NOT_FOUND, "no password provided").into_response(),
    };

    let (function, fmt) = match command.split_once('.') {
        Some((function, fmt)) => (function, fmt),
        None => return (StatusCode::NOT_FOUND, "unknown command").into_response(),
    };

    if fmt != "json" {
        return (StatusCode::UNSUPPORTED_MEDIA_TYPE, "unknown format").into_response();
    }

    let oracle = state.oracle.read().await;
    match function {
        "available" => Json(oracle.available(password)).into_response(),
        "entropy" => match oracle.entropy(password) {
            Some(bits) => Json(bits).into_response(),
            None => StatusCode::SERVICE_UNAVAILABLE.into_response(),
        },
        "all" => Json(AllResponse::from(oracle.all(password))).into_response(),
        _ => (StatusCode::NOT_FOUND, "unknown command").into_response(),
    }
}

/// Records a password as recently chosen (spec.md §4.5 `add`).
#[utoipa::path(
    post,
    path = "/add",
    request_body(content = AddForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 201, description = "Password recorded"),
        (status = 404, description = "Missing password")
    ),
    tag = "oracle"
)]
pub async fn add_password(State(state): State<AppState>, Form(form): Form<AddForm>) -> Response {
    if form.password.is_empty() {
        return (StatusCode::NOT_FOUND, "missing password").into_response();
    }

    let mut oracle = state.oracle.write().await;
    match oracle.add(&form.password) {
        Ok(()) => StatusCode::CREATED.into_response(),
        Err(err) => {
            tracing::error!(error = %err, "invariant violation while adding password");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
