use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;

use crate::validation::FieldErrors;

/// Failures of the profile service. Every variant renders as
/// `{"detail": ...}`.
#[derive(Debug, thiserror::Error)]
pub enum ProfileError {
    #[error("validation failed for {} field(s)", .0.len())]
    Validation(FieldErrors),
    #[error("Email already exists: {0}")]
    EmailTaken(String),
    #[error("Profile not found with id: {0}")]
    NotFound(i64),
    #[error("{0}")]
    BadRequest(String),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ProfileError {
    pub fn status(&self) -> StatusCode {
        match self {
            ProfileError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ProfileError::EmailTaken(_) => StatusCode::CONFLICT,
            ProfileError::NotFound(_) => StatusCode::NOT_FOUND,
            ProfileError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ProfileError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ProfileError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            ProfileError::Validation(errors) => json!({ "detail": errors }),
            ProfileError::Internal(e) => {
                error!(error = %e, "internal error");
                json!({ "detail": "Internal server error" })
            }
            other => json!({ "detail": other.to_string() }),
        };
        (status, Json(body)).into_response()
    }
}

impl From<sqlx::Error> for ProfileError {
    fn from(e: sqlx::Error) -> Self {
        ProfileError::Internal(e.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes() {
        assert_eq!(
            ProfileError::Validation(FieldErrors::new()).status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(ProfileError::EmailTaken("a@b.co".into()).status(), StatusCode::CONFLICT);
        assert_eq!(ProfileError::NotFound(1).status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ProfileError::Internal(anyhow::anyhow!("boom")).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn messages_match_wire_text() {
        assert_eq!(
            ProfileError::NotFound(42).to_string(),
            "Profile not found with id: 42"
        );
        assert_eq!(
            ProfileError::EmailTaken("a@b.co".into()).to_string(),
            "Email already exists: a@b.co"
        );
    }
}
