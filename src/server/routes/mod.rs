mod categories;
mod questions;
mod quizzes;

pub use categories::category_router;
pub use questions::questions_router;
pub use quizzes::quizzes_router;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Bad Request: {0}")]
    BadRequest(String),
    #[error("Requested entity is Not Found")]
    NotFound,
    #[error("Unprocessable Entity: {0}")]
    Unprocessable(String),
    #[error("Internal Server Error: {0}")]
    Internal(String),
}

pub type ApiResponse<T> = Result<Json<T>, ApiError>;

impl ApiError {
    pub fn bad_request(err: impl ToString) -> Self {
        ApiError::BadRequest(err.to_string())
    }

    pub fn unprocessable(err: impl ToString) -> Self {
        ApiError::Unprocessable(err.to_string())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Unprocessable(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(error: sqlx::Error) -> ApiError {
        match error {
            sqlx::Error::RowNotFound => ApiError::NotFound,
            error => ApiError::Internal(error.to_string()),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    success: bool,
    message: String,
    error: u16,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("{self}");
        } else {
            tracing::debug!("{self}");
        }
        let body = ErrorBody {
            success: false,
            message: self.to_string(),
            error: status.as_u16(),
        };
        (status, Json(body)).into_response()
    }
}
