use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use service::errors::ServiceError;
use tracing::{error, warn};

/// Error response rendered as `{"error": <message>}`.
#[derive(Debug)]
pub struct JsonApiError {
    pub status: StatusCode,
    pub message: String,
}

impl JsonApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self { status, message: message.into() }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    /// Map a service failure. Uniqueness conflicts use `conflict_status`:
    /// schools answer 400 and students 409.
    pub fn from_service(err: ServiceError, conflict_status: StatusCode) -> Self {
        let status = match &err {
            ServiceError::Validation(_) => StatusCode::BAD_REQUEST,
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::Conflict(_) => conflict_status,
            ServiceError::Capacity(_) => StatusCode::FORBIDDEN,
            ServiceError::Db(detail) => {
                error!(error = %detail, "store failure");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        if status.is_client_error() {
            warn!(status = status.as_u16(), error = %err, "request rejected");
        }
        Self::new(status, err.public_message())
    }
}

impl IntoResponse for JsonApiError {
    fn into_response(self) -> Response {
        (self.status, Json(serde_json::json!({"error": self.message}))).into_response()
    }
}
