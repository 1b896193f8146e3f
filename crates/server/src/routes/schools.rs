use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use service::{
    school_service,
    views::{serialize_school, SchoolView},
};
use tracing::warn;

use crate::errors::JsonApiError;
use crate::routes::{search_query, MessageResponse, SearchParams};
use crate::state::ServerState;

/// Duplicate names answer 400, not 409.
const CONFLICT_STATUS: StatusCode = StatusCode::BAD_REQUEST;

#[derive(Debug, Deserialize)]
pub struct CreateSchoolInput {
    pub name: Option<String>,
    pub capacity: Option<i64>,
}

fn school_id(path: Result<Path<i32>, PathRejection>) -> Result<i32, JsonApiError> {
    // non-numeric ids cannot name a school
    path.map(|Path(id)| id).map_err(|_| JsonApiError::not_found("School not found"))
}

#[utoipa::path(
    post, path = "/schools", tag = "schools",
    request_body = crate::openapi::CreateSchoolRequest,
    responses(
        (status = 201, description = "Created", body = crate::openapi::SchoolDoc),
        (status = 400, description = "Missing fields, invalid values or duplicate name", body = crate::openapi::ErrorResponse)
    )
)]
pub async fn create(
    State(state): State<ServerState>,
    payload: Result<Json<CreateSchoolInput>, JsonRejection>,
) -> Result<(StatusCode, Json<SchoolView>), JsonApiError> {
    let input = match payload {
        Ok(Json(input)) => input,
        Err(e) => {
            warn!(error = %e, "unreadable school payload");
            return Err(JsonApiError::bad_request("Name and capacity are required"));
        }
    };
    let (Some(name), Some(capacity)) = (input.name, input.capacity) else {
        return Err(JsonApiError::bad_request("Name and capacity are required"));
    };

    let created = school_service::create_school(&state.db, &name, capacity)
        .await
        .map_err(|e| JsonApiError::from_service(e, CONFLICT_STATUS))?;
    Ok((StatusCode::CREATED, Json(serialize_school(&created, &[], false))))
}

#[utoipa::path(
    delete, path = "/schools/{id}", tag = "schools",
    params(("id" = i32, Path, description = "School id")),
    responses(
        (status = 200, description = "Deleted along with its students", body = crate::openapi::MessageDoc),
        (status = 404, description = "Not Found", body = crate::openapi::ErrorResponse)
    )
)]
pub async fn delete(
    State(state): State<ServerState>,
    path: Result<Path<i32>, PathRejection>,
) -> Result<Json<MessageResponse>, JsonApiError> {
    let id = school_id(path)?;
    school_service::delete_school(&state.db, id)
        .await
        .map_err(|e| JsonApiError::from_service(e, CONFLICT_STATUS))?;
    Ok(MessageResponse::new("School deleted successfully"))
}

#[utoipa::path(
    get, path = "/schools", tag = "schools",
    responses((status = 200, description = "All schools with nested students", body = [crate::openapi::SchoolDoc]))
)]
pub async fn list(State(state): State<ServerState>) -> Result<Json<Vec<SchoolView>>, JsonApiError> {
    let all = school_service::list_schools(&state.db)
        .await
        .map_err(|e| JsonApiError::from_service(e, CONFLICT_STATUS))?;
    Ok(Json(all.iter().map(|s| serialize_school(&s.school, &s.students, true)).collect()))
}

#[utoipa::path(
    get, path = "/schools/{id}", tag = "schools",
    params(("id" = i32, Path, description = "School id")),
    responses(
        (status = 200, description = "School with nested students", body = crate::openapi::SchoolDoc),
        (status = 404, description = "Not Found", body = crate::openapi::ErrorResponse)
    )
)]
pub async fn get(
    State(state): State<ServerState>,
    path: Result<Path<i32>, PathRejection>,
) -> Result<Json<SchoolView>, JsonApiError> {
    let id = school_id(path)?;
    let found = school_service::get_school(&state.db, id)
        .await
        .map_err(|e| JsonApiError::from_service(e, CONFLICT_STATUS))?;
    Ok(Json(serialize_school(&found.school, &found.students, true)))
}

#[utoipa::path(
    get, path = "/schools/search", tag = "schools",
    params(SearchParams),
    responses(
        (status = 200, description = "Matching schools, without nested students", body = [crate::openapi::SchoolDoc]),
        (status = 400, description = "Missing query", body = crate::openapi::ErrorResponse)
    )
)]
pub async fn search(
    State(state): State<ServerState>,
    params: Result<Query<SearchParams>, QueryRejection>,
) -> Result<Json<Vec<SchoolView>>, JsonApiError> {
    let query = search_query(params)?;
    let hits = school_service::search_schools(&state.db, query.as_deref())
        .await
        .map_err(|e| JsonApiError::from_service(e, CONFLICT_STATUS))?;
    Ok(Json(hits.iter().map(|s| serialize_school(&s.school, &s.students, false)).collect()))
}
