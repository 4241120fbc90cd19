use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Request-level failure, rendered as a status code plus an `{"error": ...}`
/// body. Store and internal failures keep their detail in the log only.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Forbidden")]
    Forbidden,

    #[error("{0}")]
    NotFound(&'static str),

    #[error("{0}")]
    Conflict(String),

    #[error("database error: {0}")]
    Database(sqlx::Error),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::Validation(message.into())
    }
}

/// Unique violations become conflicts with a caller-facing message; anything
/// else from the store is a plain 500.
impl From<sqlx::Error> for ApiError {
    fn from(e: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db) = &e {
            if db.is_unique_violation() {
                return ApiError::Conflict(conflict_message(db.message()));
            }
        }
        ApiError::Database(e)
    }
}

// SQLite reports the violated index as "UNIQUE constraint failed: <table>.<column>".
fn conflict_message(detail: &str) -> String {
    if detail.contains("users.email") {
        "Email already registered".into()
    } else if detail.contains("users.username") {
        "Username already taken".into()
    } else if detail.contains("blog_posts.title") {
        "A post with this title already exists".into()
    } else {
        "Already exists".into()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ApiError::InvalidCredentials => {
                (StatusCode::UNAUTHORIZED, "Invalid credentials".to_string())
            }
            ApiError::Forbidden => (StatusCode::FORBIDDEN, "Forbidden".to_string()),
            ApiError::NotFound(what) => (StatusCode::NOT_FOUND, (*what).to_string()),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
            ApiError::Database(e) => {
                error!(error = %e, "database error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            ApiError::Internal(e) => {
                error!(error = %e, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn variants_map_to_their_status_codes() {
        let cases = [
            (ApiError::validation("bad"), StatusCode::BAD_REQUEST),
            (ApiError::InvalidCredentials, StatusCode::UNAUTHORIZED),
            (ApiError::Forbidden, StatusCode::FORBIDDEN),
            (ApiError::NotFound("Post not found"), StatusCode::NOT_FOUND),
            (
                ApiError::Conflict("Email already registered".into()),
                StatusCode::CONFLICT,
            ),
            (
                ApiError::Database(sqlx::Error::RowNotFound),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }

    #[test]
    fn conflict_messages_name_the_duplicate_field() {
        assert_eq!(
            conflict_message("UNIQUE constraint failed: users.email"),
            "Email already registered"
        );
        assert_eq!(
            conflict_message("UNIQUE constraint failed: users.username"),
            "Username already taken"
        );
        assert_eq!(
            conflict_message("UNIQUE constraint failed: blog_posts.title"),
            "A post with this title already exists"
        );
        assert_eq!(conflict_message("UNIQUE constraint failed: other.col"), "Already exists");
    }

    #[test]
    fn non_unique_store_errors_stay_internal() {
        let err = ApiError::from(sqlx::Error::RowNotFound);
        assert!(matches!(err, ApiError::Database(_)));
    }

    #[test]
    fn validation_displays_its_message() {
        assert_eq!(ApiError::validation("Username is required").to_string(), "Username is required");
    }
}
