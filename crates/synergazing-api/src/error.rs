//! Mapping of domain errors onto HTTP responses

use axum::{http::StatusCode, Json};
use synergazing_core::ServiceError;
use tracing::{debug, error};

use crate::models::ErrorResponse;

/// Error half of every handler result
pub type ApiError = (StatusCode, Json<ErrorResponse>);

pub fn status_for(err: &ServiceError) -> StatusCode {
    match err {
        ServiceError::Validation(_)
        | ServiceError::StageSequence { .. }
        | ServiceError::Capacity(_)
        | ServiceError::Conflict(_) => StatusCode::BAD_REQUEST,
        ServiceError::Unauthorized(_) => StatusCode::FORBIDDEN,
        ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
        ServiceError::InvalidCredentials => StatusCode::UNAUTHORIZED,
        ServiceError::Internal(_) | ServiceError::Database(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

/// Convert a [`ServiceError`] into the JSON error response.
///
/// Persistence and internal failures are logged and replaced by a generic
/// message.
pub fn api_error(err: ServiceError) -> ApiError {
    let status = status_for(&err);

    let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
        error!("Request failed: {}", err);
        "Internal server error".to_string()
    } else {
        debug!("Request rejected ({}): {}", status, err);
        err.to_string()
    };

    (status, Json(ErrorResponse::new(message, err.code())))
}
