use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use service::{
    student_service::{self, NewStudent},
    views::{serialize_student, StudentView},
};
use tracing::warn;

use crate::errors::JsonApiError;
use crate::routes::{search_query, MessageResponse, SearchParams};
use crate::state::ServerState;

const CONFLICT_STATUS: StatusCode = StatusCode::CONFLICT;

#[derive(Debug, Deserialize)]
pub struct CreateStudentInput {
    pub id: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub school_id: Option<i32>,
}

impl CreateStudentInput {
    fn complete(self) -> Option<NewStudent> {
        Some(NewStudent {
            id: self.id?,
            first_name: self.first_name?,
            last_name: self.last_name?,
            school_id: self.school_id?,
        })
    }
}

#[utoipa::path(
    post, path = "/students", tag = "students",
    request_body = crate::openapi::CreateStudentRequest,
    responses(
        (status = 201, description = "Created", body = crate::openapi::StudentDoc),
        (status = 400, description = "Missing or invalid fields", body = crate::openapi::ErrorResponse),
        (status = 403, description = "School is at maximum capacity", body = crate::openapi::ErrorResponse),
        (status = 404, description = "School not found", body = crate::openapi::ErrorResponse),
        (status = 409, description = "Student id already exists", body = crate::openapi::ErrorResponse)
    )
)]
pub async fn create(
    State(state): State<ServerState>,
    payload: Result<Json<CreateStudentInput>, JsonRejection>,
) -> Result<(StatusCode, Json<StudentView>), JsonApiError> {
    let input = match payload {
        Ok(Json(input)) => input,
        Err(e) => {
            warn!(error = %e, "unreadable student payload");
            return Err(JsonApiError::bad_request("Missing required fields"));
        }
    };
    let input = input
        .complete()
        .ok_or_else(|| JsonApiError::bad_request("Missing required fields"))?;

    let created = student_service::create_student(&state.db, input)
        .await
        .map_err(|e| JsonApiError::from_service(e, CONFLICT_STATUS))?;
    Ok((StatusCode::CREATED, Json(serialize_student(&created))))
}

#[utoipa::path(
    delete, path = "/students/{id}", tag = "students",
    params(("id" = String, Path, description = "Student id")),
    responses(
        (status = 200, description = "Deleted", body = crate::openapi::MessageDoc),
        (status = 404, description = "Not Found", body = crate::openapi::ErrorResponse)
    )
)]
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, JsonApiError> {
    student_service::delete_student(&state.db, &id)
        .await
        .map_err(|e| JsonApiError::from_service(e, CONFLICT_STATUS))?;
    Ok(MessageResponse::new("Student deleted successfully"))
}

#[utoipa::path(
    get, path = "/students", tag = "students",
    responses((status = 200, description = "All students", body = [crate::openapi::StudentDoc]))
)]
pub async fn list(State(state): State<ServerState>) -> Result<Json<Vec<StudentView>>, JsonApiError> {
    let all = student_service::list_students(&state.db)
        .await
        .map_err(|e| JsonApiError::from_service(e, CONFLICT_STATUS))?;
    Ok(Json(all.iter().map(serialize_student).collect()))
}

#[utoipa::path(
    get, path = "/students/{id}", tag = "students",
    params(("id" = String, Path, description = "Student id")),
    responses(
        (status = 200, description = "OK", body = crate::openapi::StudentDoc),
        (status = 404, description = "Not Found", body = crate::openapi::ErrorResponse)
    )
)]
pub async fn get(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Result<Json<StudentView>, JsonApiError> {
    let found = student_service::get_student(&state.db, &id)
        .await
        .map_err(|e| JsonApiError::from_service(e, CONFLICT_STATUS))?;
    Ok(Json(serialize_student(&found)))
}

#[utoipa::path(
    get, path = "/students/search", tag = "students",
    params(SearchParams),
    responses(
        (status = 200, description = "Students whose first or last name matches", body = [crate::openapi::StudentDoc]),
        (status = 400, description = "Missing query", body = crate::openapi::ErrorResponse)
    )
)]
pub async fn search(
    State(state): State<ServerState>,
    params: Result<Query<SearchParams>, QueryRejection>,
) -> Result<Json<Vec<StudentView>>, JsonApiError> {
    let query = search_query(params)?;
    let hits = student_service::search_students(&state.db, query.as_deref())
        .await
        .map_err(|e| JsonApiError::from_service(e, CONFLICT_STATUS))?;
    Ok(Json(hits.iter().map(serialize_student).collect()))
}
