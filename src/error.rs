/// Offsec Program - Custom error types.
///
/// All errors use `thiserror` for proper error handling without `unwrap()`.
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// Main application error type.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] diesel::result::Error),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Authorization error: {0}")]
    Forbidden(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::Database(e) => {
                tracing::error!("Database error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Database operation failed".to_string(),
                )
            }
            AppError::Auth(msg) => (StatusCode::UNAUTHORIZED, msg),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Internal(e) => {
                tracing::error!("Internal error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            AppError::Config(msg) => {
                tracing::error!("Configuration error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Configuration error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": error_message,
            "status": status.as_u16(),
        }));

        (status, body).into_response()
    }
}

impl AppError {
    /// Map diesel's row-not-found to a domain 404, everything else to a
    /// database error.
    pub fn from_diesel(e: diesel::result::Error, what: &str) -> Self {
        match e {
            diesel::result::Error::NotFound => AppError::NotFound(format!("{} not found", what)),
            other => AppError::Database(other),
        }
    }
}

/// Result type alias for convenience.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== Display Tests ====================

    #[test]
    fn test_app_error_display_not_found() {
        let error = AppError::NotFound("Engagement not found".to_string());
        assert_eq!(error.to_string(), "Not found: Engagement not found");
    }

    #[test]
    fn test_app_error_display_auth() {
        let error = AppError::Auth("Invalid API key".to_string());
        assert_eq!(error.to_string(), "Authentication error: Invalid API key");
    }

    #[test]
    fn test_app_error_display_forbidden() {
        let error = AppError::Forbidden("Admins only".to_string());
        assert_eq!(error.to_string(), "Authorization error: Admins only");
    }

    #[test]
    fn test_app_error_display_validation() {
        let error = AppError::Validation("Invalid severity".to_string());
        assert_eq!(error.to_string(), "Validation error: Invalid severity");
    }

    // ==================== IntoResponse Tests ====================

    #[test]
    fn test_app_error_into_response_auth_status() {
        let response = AppError::Auth("Invalid API key".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_app_error_into_response_forbidden_status() {
        let response = AppError::Forbidden("Admins only".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_app_error_into_response_validation_status() {
        let response = AppError::Validation("bad input".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_app_error_into_response_not_found_status() {
        let response = AppError::NotFound("nope".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_app_error_into_response_internal_status() {
        let response = AppError::Internal(anyhow::anyhow!("boom")).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_app_error_into_response_database_status() {
        let response =
            AppError::Database(diesel::result::Error::RollbackTransaction).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    // ==================== from_diesel Tests ====================

    #[test]
    fn test_from_diesel_not_found_maps_to_404() {
        let error = AppError::from_diesel(diesel::result::Error::NotFound, "Engagement");
        match error {
            AppError::NotFound(msg) => assert_eq!(msg, "Engagement not found"),
            other => panic!("Expected NotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_from_diesel_other_maps_to_database() {
        let error = AppError::from_diesel(diesel::result::Error::RollbackTransaction, "Engagement");
        assert!(matches!(error, AppError::Database(_)));
    }

    // ==================== From Trait Tests ====================

    #[test]
    fn test_app_error_from_anyhow() {
        let app_error: AppError = anyhow::anyhow!("infra failure").into();
        assert!(matches!(app_error, AppError::Internal(_)));
    }

    #[test]
    fn test_app_error_from_diesel_error() {
        let app_error: AppError = diesel::result::Error::NotFound.into();
        assert!(matches!(app_error, AppError::Database(_)));
    }
}
