use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::access::Action;

#[derive(Debug, Error)]
pub enum UserError {
    #[error("Permission denied: {action}")]
    PermissionDenied { action: Action },

    #[error("User not found: {0}")]
    NotFound(Uuid),

    #[error("Storage unavailable: {0}")]
    Storage(String),

    #[error("Notification error: {0}")]
    Notification(String),

    #[error("User with email '{0}' already exists")]
    DuplicateEmail(String),

    #[error("Nickname '{0}' is already taken")]
    DuplicateNickname(String),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Invalid or expired verification token")]
    InvalidVerificationToken,

    #[error("Email already verified")]
    EmailAlreadyVerified,

    #[error("Invalid role: {0}")]
    InvalidRole(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Password hashing error: {0}")]
    PasswordHash(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type UserResult<T> = Result<T, UserError>;

impl From<sea_orm::DbErr> for UserError {
    fn from(err: sea_orm::DbErr) -> Self {
        UserError::Storage(err.to_string())
    }
}

impl From<email::NotificationError> for UserError {
    fn from(err: email::NotificationError) -> Self {
        UserError::Notification(err.to_string())
    }
}

impl From<validator::ValidationErrors> for UserError {
    fn from(err: validator::ValidationErrors) -> Self {
        UserError::Validation(err.to_string())
    }
}

/// Error body returned by the users API
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorDetail {
    /// Machine-readable error type, e.g. `forbidden`
    #[serde(rename = "type")]
    pub error_type: String,
    pub message: String,
}

impl IntoResponse for UserError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match &self {
            UserError::PermissionDenied { action } => (
                StatusCode::FORBIDDEN,
                "forbidden",
                format!("Action '{}' is not permitted", action),
            ),
            UserError::NotFound(id) => (
                StatusCode::NOT_FOUND,
                "not_found",
                format!("User {} not found", id),
            ),
            UserError::Storage(msg) => {
                tracing::error!("Storage error: {}", msg);
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "storage_unavailable",
                    "Storage is temporarily unavailable".to_string(),
                )
            }
            UserError::Notification(msg) => {
                tracing::error!("Notification error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "notification_error",
                    "Failed to send notification".to_string(),
                )
            }
            UserError::DuplicateEmail(email) => (
                StatusCode::CONFLICT,
                "duplicate_email",
                format!("User with email '{}' already exists", email),
            ),
            UserError::DuplicateNickname(nickname) => (
                StatusCode::CONFLICT,
                "duplicate_nickname",
                format!("Nickname '{}' is already taken", nickname),
            ),
            UserError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, "validation_error", msg.clone())
            }
            UserError::InvalidVerificationToken => (
                StatusCode::BAD_REQUEST,
                "invalid_token",
                "Invalid or expired verification token".to_string(),
            ),
            UserError::EmailAlreadyVerified => (
                StatusCode::BAD_REQUEST,
                "email_already_verified",
                "Email address has already been verified".to_string(),
            ),
            UserError::InvalidRole(role) => (
                StatusCode::BAD_REQUEST,
                "invalid_role",
                format!("Unknown role: {}", role),
            ),
            UserError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "unauthorized",
                "Unauthorized".to_string(),
            ),
            UserError::PasswordHash(msg) => {
                tracing::error!("Password hash error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                )
            }
            UserError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                )
            }
        };

        (
            status,
            Json(json!({
                "error": {
                    "type": error_type,
                    "message": message
                }
            })),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: UserError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            status_of(UserError::PermissionDenied {
                action: Action::UpdateProfile
            }),
            StatusCode::FORBIDDEN
        );
        assert_eq!(status_of(UserError::NotFound(Uuid::nil())), StatusCode::NOT_FOUND);
        assert_eq!(
            status_of(UserError::Storage("down".into())),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            status_of(UserError::DuplicateNickname("ada".into())),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(UserError::InvalidRole("root".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(UserError::EmailAlreadyVerified),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(status_of(UserError::Unauthorized), StatusCode::UNAUTHORIZED);
        assert_eq!(
            status_of(UserError::Notification("smtp".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn test_internal_details_are_not_leaked() {
        let response = UserError::Storage("connection refused at 10.0.0.5".into()).into_response();
        let bytes = http_body_util::BodyExt::collect(response.into_body())
            .await
            .unwrap()
            .to_bytes();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(body["error"]["type"], "storage_unavailable");
        assert!(!body["error"]["message"].as_str().unwrap().contains("10.0.0.5"));
    }
}
