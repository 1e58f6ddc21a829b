use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::db::StoreError;
use crate::models::{FieldError, ValidationError};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Request validation failed")]
    Validation(Vec<FieldError>),

    /// The body could not be read as the expected JSON. Carries the status
    /// axum assigns to the rejection (400, 413, 415 or 422).
    #[error("{message}")]
    MalformedBody { status: StatusCode, message: String },

    #[error("{0}")]
    BadRequest(&'static str),

    #[error("Database not configured")]
    DatabaseNotConfigured,

    #[error("Database error: {0}")]
    Store(#[from] StoreError),
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    fields: Vec<FieldError>,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::MalformedBody { status, .. } => *status,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::DatabaseNotConfigured | ApiError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (message, fields) = match self {
            ApiError::Validation(fields) => ("Request validation failed".to_string(), fields),
            ApiError::Store(err) => {
                tracing::error!("Store call failed: {}", err);
                (format!("Database error: {}", err), Vec::new())
            }
            other => (other.to_string(), Vec::new()),
        };

        let body = Json(ErrorResponse {
            error: status.to_string(),
            message,
            fields,
        });

        (status, body).into_response()
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::Fields(fields) => ApiError::Validation(fields),
            ValidationError::MalformedId(message) => ApiError::BadRequest(message),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::MalformedBody {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}
