use crate::infrastructure::pool::PoolError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation error: {0}")]
    ValidationError(String),
    #[error("Bad request: {0}")]
    BadRequest(String),
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),
    #[error("Internal server error: {0}")]
    InternalServerError(#[from] anyhow::Error),
}

impl From<PoolError> for AppError {
    fn from(err: PoolError) -> Self {
        tracing::error!(error = %err, "no database connection for request");
        AppError::ServiceUnavailable("Database is busy, try again shortly".to_string())
    }
}

/// Repository error mapper for inserts guarded by a uniqueness constraint.
///
/// A duplicate that slipped past the existence check surfaces from Postgres
/// as a unique violation; it becomes `409 detail` like the checked case.
pub fn conflict_on_duplicate(detail: &'static str) -> impl Fn(anyhow::Error) -> AppError {
    move |err| {
        let duplicate = matches!(
            err.downcast_ref::<sqlx::Error>(),
            Some(sqlx::Error::Database(db)) if db.is_unique_violation()
        );
        if duplicate {
            tracing::warn!(error = %err, "concurrent duplicate insert");
            AppError::Conflict(detail.to_string())
        } else {
            AppError::InternalServerError(err)
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorDetail {
    #[schema(example = 404)]
    pub status: u16,
    #[schema(example = "Job posting not found")]
    pub detail: String,
}

/// Body of every non-2xx response
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub errors: Vec<ErrorDetail>,
}

impl AppError {
    fn status_and_detail(self) -> (StatusCode, String) {
        match self {
            AppError::ValidationError(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            AppError::ServiceUnavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg),
            AppError::InternalServerError(e) => {
                tracing::error!("Internal server error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, detail) = self.status_and_detail();

        let body = ErrorResponse {
            errors: vec![ErrorDetail {
                status: status.as_u16(),
                detail,
            }],
        };

        (status, Json(body)).into_response()
    }
}
