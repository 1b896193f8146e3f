use axum::{
    extract::{rejection::QueryRejection, Query},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{warn, Level};
use utoipa::OpenApi;

use common::types::Health;

use crate::errors::JsonApiError;
use crate::openapi::ApiDoc;
use crate::state::ServerState;

pub mod schools;
pub mod students;

/// Body of successful deletions: `{"message": ...}`.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Json<Self> {
        Json(Self { message: message.into() })
    }
}

/// `?query=` of both search routes.
#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchParams {
    /// Case-insensitive substring to look for
    pub query: Option<String>,
}

/// Unparsable query strings answer 400 in the JSON error shape.
pub(crate) fn search_query(
    params: Result<Query<SearchParams>, QueryRejection>,
) -> Result<Option<String>, JsonApiError> {
    match params {
        Ok(Query(params)) => Ok(params.query),
        Err(e) => {
            warn!(error = %e, "unreadable query string");
            Err(JsonApiError::bad_request("Query parameter required"))
        }
    }
}

#[utoipa::path(
    get, path = "/health", tag = "health",
    responses((status = 200, description = "Service is up", body = crate::openapi::HealthResponse))
)]
pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Build the full application router.
pub fn build_router(state: ServerState, cors: CorsLayer) -> Router {
    let schools = Router::new()
        .route("/schools", get(schools::list).post(schools::create))
        .route("/schools/search", get(schools::search))
        .route("/schools/:id", get(schools::get).delete(schools::delete));

    let students = Router::new()
        .route("/students", get(students::list).post(students::create))
        .route("/students/search", get(students::search))
        .route("/students/:id", get(students::get).delete(students::delete));

    Router::new()
        .route("/health", get(health))
        .route("/api-docs/openapi.json", get(openapi_json))
        .merge(schools)
        .merge(students)
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(
                    TraceLayer::new_for_http()
                        // 每次请求创建 span，包含方法和路径
                        .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
                        .on_request(DefaultOnRequest::new().level(Level::INFO))
                        // 响应返回时记录状态码与耗时
                        .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
                        .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
                )
                .layer(cors),
        )
}
