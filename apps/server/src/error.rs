use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use policyhub_core::errors::Error as CoreError;
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Core(#[from] CoreError),
}

#[derive(Serialize)]
struct ErrorBody {
    code: u16,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let ApiError::Core(e) = &self;
        let status = match e {
            CoreError::NotFound { .. } => StatusCode::NOT_FOUND,
            CoreError::Validation(_) | CoreError::Formula(_) => StatusCode::BAD_REQUEST,
            CoreError::ConstraintViolation(_) => StatusCode::CONFLICT,
            CoreError::Remote(_) => StatusCode::BAD_GATEWAY,
            CoreError::Repository(_) | CoreError::Unexpected(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        let msg = e.to_string();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", msg);
        }
        let body = Json(ErrorBody {
            code: status.as_u16(),
            message: msg,
        });
        (status, body).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
