use serde::{Deserialize, Serialize};

use crate::extractors::auth::AuthUser;

/// Purpose of an emailed verification code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeKind {
    Register,
    Login,
}

impl CodeKind {
    pub fn parse(kind: &str) -> Option<Self> {
        match kind.trim() {
            "register" => Some(CodeKind::Register),
            "login" => Some(CodeKind::Login),
            _ => None,
        }
    }

    /// Cache key holding the pending code for `email`.
    pub fn cache_key(self, email: &str) -> String {
        match self {
            CodeKind::Register => format!("emailcode-register-{email}"),
            CodeKind::Login => format!("emailcode-login-{email}"),
        }
    }
}

/// Request body for mailing a verification code.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct AuthCodeRequest {
    #[schema(example = "alice@example.com")]
    pub email: String,
    /// `register` or `login`.
    #[schema(example = "register")]
    pub kind: String,
}

/// Request body for password login.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct PasswordLoginRequest {
    /// Login name or email address.
    #[schema(example = "alice123")]
    pub account: String,
    #[schema(example = "s3cret!")]
    pub password: String,
}

/// Request body for email-code login.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct EmailLoginRequest {
    #[schema(example = "alice@example.com")]
    pub email: String,
    #[schema(example = "482913")]
    pub code: String,
}

/// Request body for user registration.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct RegisterRequest {
    /// Display name; the login name is derived from it.
    #[serde(default)]
    #[schema(example = "爱丽丝")]
    pub username: String,
    #[schema(example = "alice@example.com")]
    pub email: String,
    /// At least 6 characters.
    #[schema(example = "s3cret!")]
    pub password: String,
    #[schema(example = "482913")]
    pub code: String,
}

/// Issued session token.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct TokenResponse {
    #[schema(example = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9...")]
    pub token: String,
}

/// Claims of the current session.
#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MeResponse {
    #[schema(example = 42)]
    pub id: i32,
    pub avatar: String,
    #[schema(example = "爱丽丝")]
    pub user_name: String,
    #[schema(example = "ailisi123")]
    pub login_name: String,
    pub phone: String,
    pub email: String,
    #[schema(example = json!([2]))]
    pub roles: Vec<i32>,
    #[schema(example = json!(["problem:view"]))]
    pub permissions: Vec<String>,
}

impl From<AuthUser> for MeResponse {
    fn from(user: AuthUser) -> Self {
        Self {
            id: user.user_id,
            avatar: user.avatar,
            user_name: user.user_name,
            login_name: user.login_name,
            phone: user.phone,
            email: user.email,
            roles: user.roles,
            permissions: user.permissions,
        }
    }
}
