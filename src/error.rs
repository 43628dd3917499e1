use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use crate::store::StoreError;

pub type AppResult<T> = Result<T, AppError>;

/// Errors a handler can return. Every variant renders as `{"error": "..."}`.
#[derive(Debug, Error)]
pub enum AppError {
    /// Missing or invalid input (422).
    #[error("{0}")]
    Validation(String),

    /// Unique constraint hit in the store (422).
    #[error("{0}")]
    Conflict(String),

    /// No session, a stale session, or bad credentials (401).
    #[error("Unauthorized")]
    Unauthorized,

    /// Body that is not JSON at all (400).
    #[error("{0}")]
    BadRequest(String),

    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::Conflict(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let AppError::Internal(e) = &self {
            error!(error = %e, "internal error");
        }
        let body = Json(ErrorBody {
            error: self.to_string(),
        });
        (self.status(), body).into_response()
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::UniqueViolation(msg) => AppError::Conflict(msg),
            StoreError::Constraint(msg) => AppError::Validation(msg),
            StoreError::Database(e) => AppError::Internal(e.into()),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        match rejection {
            JsonRejection::JsonDataError(e) => AppError::Validation(e.body_text()),
            other => AppError::BadRequest(other.body_text()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_follow_taxonomy() {
        assert_eq!(
            AppError::Validation("x".into()).status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            AppError::Conflict("Username already exists".into()).status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(AppError::Unauthorized.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            AppError::Internal(anyhow::anyhow!("boom")).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn internal_error_message_is_not_leaked() {
        let err = AppError::Internal(anyhow::anyhow!("connection refused to 10.0.0.3"));
        assert_eq!(err.to_string(), "Internal server error");
    }

    #[test]
    fn store_errors_map_to_422_or_500() {
        let conflict: AppError = StoreError::UniqueViolation("dup".into()).into();
        assert!(matches!(conflict, AppError::Conflict(_)));

        let constraint: AppError = StoreError::Constraint("value too long".into()).into();
        assert_eq!(constraint.to_string(), "value too long");

        let db: AppError = StoreError::Database(sqlx::Error::PoolTimedOut).into();
        assert_eq!(db.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
