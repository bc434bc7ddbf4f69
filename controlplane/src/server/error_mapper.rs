//! Maps control plane errors onto HTTP responses

use axum::{http::StatusCode, response::IntoResponse, Json};
use openapi_server::models::ErrorResponse;
use tracing::error;

use crate::errors::ServerError;

pub fn status_code(err: &ServerError) -> StatusCode {
    match err {
        ServerError::Validation(_) => StatusCode::BAD_REQUEST,
        ServerError::NotFound(_) => StatusCode::NOT_FOUND,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

pub fn into_response(err: ServerError) -> axum::response::Response {
    let status = status_code(&err);
    let body = match err {
        ServerError::Validation(errors) => ErrorResponse {
            message: "Invalid request".to_string(),
            validation_errors: errors.to_models(),
        },
        ServerError::NotFound(message) => ErrorResponse {
            message,
            validation_errors: Vec::new(),
        },
        other => {
            error!("Request failed: {}", other);
            ErrorResponse {
                message: "Internal server error".to_string(),
                validation_errors: Vec::new(),
            }
        }
    };
    (status, Json(body)).into_response()
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        into_response(self)
    }
}
