use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use common::storage::StorageError;
use sea_orm::DbErr;
use serde::Serialize;

use crate::cache::CacheError;
use crate::mail::MailError;

/// Envelope returned by all endpoints on failure.
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorBody {
    /// Numeric error code. Business codes start at 11000; generic codes are below 10000.
    #[schema(example = 11507)]
    pub code: i32,
    /// Human-readable error description.
    #[schema(example = "Problem does not exist")]
    pub message: String,
    /// Always `null` on failure.
    #[schema(value_type = Option<Object>)]
    pub data: Option<serde_json::Value>,
}

/// Who is at fault for a business error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    BadRequest,
    Business,
    Server,
}

/// Domain errors with a stable numeric code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum BusError {
    #[error("Unknown error")]
    Unknown,

    #[error("Wrong login name or password")]
    UserNameOrPasswordWrong,
    #[error("Email address is not valid")]
    UserEmailIsNotValid,
    #[error("Email address is already registered")]
    UserEmailIsExist,
    #[error("Login name is already taken")]
    UserNameIsExist,
    #[error("Unsupported verification code type")]
    UserTypeNotSupport,
    #[error("Login verification code is wrong or expired")]
    LoginCodeWrong,
    #[error("Register verification code is wrong or expired")]
    RegisterCodeWrong,
    #[error("Invalid or expired token")]
    InvalidToken,
    #[error("Password must be at least 6 characters")]
    UserPasswordNotEnoughAccuracy,
    #[error("Could not allocate a unique login name")]
    UserCreationFailed,
    #[error("Password encoding failed")]
    PasswordEncodeFailed,
    #[error("User does not exist")]
    UserNotExist,

    #[error("Problem number is already used")]
    ProblemCodeIsExist,
    #[error("Problem does not exist")]
    ProblemNotExist,
    #[error("Problem file does not exist")]
    ProblemFileNotExist,
    #[error("File does not exist")]
    FilePathNotExist,
    #[error("Case name is already used in this problem")]
    ProblemCaseNameIsExist,
    #[error("Problem menu still contains problems")]
    ProblemMenuNotEmpty,
    #[error("Problem menu does not exist")]
    ProblemMenuNotExist,
    #[error("Problem case does not exist")]
    ProblemCaseNotExist,

    #[error("Language is not supported by this problem")]
    LanguageNotSupported,

    #[error("Permission data is inconsistent")]
    PermissionUnknownError,
    #[error("Permission does not exist")]
    PermissionNotExist,

    #[error("Role does not exist")]
    RoleNotExist,
}

impl BusError {
    pub fn code(self) -> i32 {
        match self {
            BusError::Unknown => 5000,
            BusError::UserNameOrPasswordWrong => 11000,
            BusError::UserEmailIsNotValid => 11001,
            BusError::UserEmailIsExist => 11002,
            BusError::UserNameIsExist => 11004,
            BusError::UserTypeNotSupport => 11005,
            BusError::LoginCodeWrong => 11006,
            BusError::RegisterCodeWrong => 11007,
            BusError::InvalidToken => 11008,
            BusError::UserPasswordNotEnoughAccuracy => 11009,
            BusError::UserCreationFailed => 11010,
            BusError::PasswordEncodeFailed => 11011,
            BusError::UserNotExist => 11012,
            BusError::ProblemCodeIsExist => 11500,
            BusError::ProblemNotExist => 11507,
            BusError::ProblemFileNotExist => 11509,
            BusError::FilePathNotExist => 11511,
            BusError::ProblemCaseNameIsExist => 11512,
            BusError::ProblemMenuNotEmpty => 11513,
            BusError::ProblemMenuNotExist => 11514,
            BusError::ProblemCaseNotExist => 11515,
            BusError::LanguageNotSupported => 12503,
            BusError::PermissionUnknownError => 13000,
            BusError::PermissionNotExist => 13001,
            BusError::RoleNotExist => 14001,
        }
    }

    pub fn category(self) -> ErrorCategory {
        match self {
            BusError::UserEmailIsNotValid
            | BusError::UserTypeNotSupport
            | BusError::InvalidToken => ErrorCategory::BadRequest,
            BusError::Unknown
            | BusError::UserCreationFailed
            | BusError::PasswordEncodeFailed
            | BusError::PermissionUnknownError => ErrorCategory::Server,
            _ => ErrorCategory::Business,
        }
    }

    /// Whether this error reports a missing resource.
    pub fn is_not_found(self) -> bool {
        matches!(
            self,
            BusError::UserNotExist
                | BusError::ProblemNotExist
                | BusError::ProblemFileNotExist
                | BusError::FilePathNotExist
                | BusError::ProblemMenuNotExist
                | BusError::ProblemCaseNotExist
                | BusError::PermissionNotExist
                | BusError::RoleNotExist
        )
    }

    fn status(self) -> StatusCode {
        match self.category() {
            ErrorCategory::BadRequest => StatusCode::BAD_REQUEST,
            ErrorCategory::Server => StatusCode::INTERNAL_SERVER_ERROR,
            ErrorCategory::Business if self.is_not_found() => StatusCode::NOT_FOUND,
            ErrorCategory::Business => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }
}

/// Application-level error type.
#[derive(Debug)]
pub enum AppError {
    Validation(String),
    TokenMissing,
    TokenInvalid,
    PermissionDenied,
    Bus(BusError),
    Database(String),
    Cache(String),
    Storage(String),
    Mail(String),
    Internal(String),
}

impl AppError {
    fn status_and_body(self) -> (StatusCode, ErrorBody) {
        let (status, code, message) = match self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, 400, msg),
            AppError::TokenMissing => (
                StatusCode::UNAUTHORIZED,
                401,
                "Authentication required".into(),
            ),
            AppError::TokenInvalid => (
                StatusCode::UNAUTHORIZED,
                BusError::InvalidToken.code(),
                BusError::InvalidToken.to_string(),
            ),
            AppError::PermissionDenied => (
                StatusCode::FORBIDDEN,
                403,
                "Insufficient permissions".into(),
            ),
            AppError::Bus(err) => {
                if err.category() == ErrorCategory::Server {
                    tracing::error!(code = err.code(), "Business fault: {}", err);
                } else {
                    tracing::debug!(code = err.code(), "Business rule violation: {}", err);
                }
                (err.status(), err.code(), err.to_string())
            }
            AppError::Database(detail) => {
                tracing::error!("Database error: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    5001,
                    "Database error".into(),
                )
            }
            AppError::Cache(detail) => {
                tracing::error!("Cache error: {}", detail);
                (StatusCode::INTERNAL_SERVER_ERROR, 5002, "Cache error".into())
            }
            AppError::Storage(detail) => {
                tracing::error!("Storage error: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    5003,
                    "Storage error".into(),
                )
            }
            AppError::Mail(detail) => {
                tracing::error!("Mail error: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    5004,
                    "Failed to send email".into(),
                )
            }
            AppError::Internal(detail) => {
                tracing::error!("Internal error: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    500,
                    "An unexpected error occurred".into(),
                )
            }
        };

        (
            status,
            ErrorBody {
                code,
                message,
                data: None,
            },
        )
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = self.status_and_body();
        (status, Json(body)).into_response()
    }
}

impl From<BusError> for AppError {
    fn from(err: BusError) -> Self {
        AppError::Bus(err)
    }
}

impl From<DbErr> for AppError {
    fn from(err: DbErr) -> Self {
        AppError::Database(err.to_string())
    }
}

impl From<CacheError> for AppError {
    fn from(err: CacheError) -> Self {
        AppError::Cache(err.to_string())
    }
}

impl From<MailError> for AppError {
    fn from(err: MailError) -> Self {
        AppError::Mail(err.to_string())
    }
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(_) => AppError::Bus(BusError::FilePathNotExist),
            StorageError::InvalidKey(key) => AppError::Validation(format!("Invalid file name: {key}")),
            StorageError::SizeLimitExceeded { actual, limit } => AppError::Validation(format!(
                "File is too large: {actual} bytes (limit {limit})"
            )),
            other => AppError::Storage(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::body::to_bytes;

    use super::*;

    async fn render(err: AppError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn not_found_business_errors_render_404() {
        let (status, body) = render(BusError::ProblemNotExist.into()).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], 11507);
        assert!(body["data"].is_null());
    }

    #[tokio::test]
    async fn rule_violations_render_422() {
        let (status, body) = render(BusError::ProblemMenuNotEmpty.into()).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["code"], 11513);
    }

    #[tokio::test]
    async fn bad_request_category_renders_400() {
        let (status, body) = render(BusError::UserEmailIsNotValid.into()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], 11001);
    }

    #[tokio::test]
    async fn invalid_token_uses_user_code() {
        let (status, body) = render(AppError::TokenInvalid).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["code"], 11008);
    }

    #[tokio::test]
    async fn database_errors_hide_details() {
        let (status, body) =
            render(DbErr::Custom("relation \"user\" does not exist".into()).into()).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["code"], 5001);
        assert_eq!(body["message"], "Database error");
    }

    #[tokio::test]
    async fn missing_objects_map_to_file_not_exist() {
        let err: AppError = StorageError::NotFound("avatar/user/x.png".into()).into();
        let (status, body) = render(err).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], 11511);
    }

    #[test]
    fn server_category_codes() {
        assert_eq!(BusError::Unknown.code(), 5000);
        assert_eq!(BusError::PermissionUnknownError.category(), ErrorCategory::Server);
        assert_eq!(BusError::Unknown.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
