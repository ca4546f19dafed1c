use axum::Json;
use axum::extract::State;
use tracing::instrument;

use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::auth::{
    AuthCodeRequest, EmailLoginRequest, MeResponse, PasswordLoginRequest, RegisterRequest,
    TokenResponse,
};
use crate::models::shared::{ApiResponse, Empty, ok, ok_message};
use crate::services::auth::AuthService;
use crate::state::AppState;

fn service(state: &AppState) -> AuthService<'_> {
    AuthService::new(
        &state.db,
        state.cache.as_ref(),
        state.mailer.as_ref(),
        &state.config.auth,
    )
}

#[utoipa::path(
    post,
    path = "/code",
    tag = "Auth",
    operation_id = "sendAuthCode",
    summary = "Mail a verification code",
    description = "Sends a 6-digit code to `email`. `kind` is `register` or `login`; the code stays valid for 10 minutes.",
    request_body = AuthCodeRequest,
    responses(
        (status = 200, description = "Code sent", body = ApiResponse<Empty>),
        (status = 400, description = "Invalid email or kind (11001, 11005)", body = ErrorBody),
        (status = 500, description = "Mail delivery failed", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(email = %payload.email, kind = %payload.kind))]
pub async fn send_code(
    State(state): State<AppState>,
    AppJson(payload): AppJson<AuthCodeRequest>,
) -> Result<Json<ApiResponse<Empty>>, AppError> {
    service(&state)
        .send_auth_code(&payload.email, &payload.kind)
        .await?;
    Ok(ok_message("verification code sent"))
}

#[utoipa::path(
    post,
    path = "/login/password",
    tag = "Auth",
    operation_id = "loginByPassword",
    summary = "Log in with password",
    description = "`account` is either an email address or a login name.",
    request_body = PasswordLoginRequest,
    responses(
        (status = 200, description = "Login successful", body = ApiResponse<TokenResponse>),
        (status = 422, description = "Wrong account or password (11000)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(account = %payload.account))]
pub async fn login_by_password(
    State(state): State<AppState>,
    AppJson(payload): AppJson<PasswordLoginRequest>,
) -> Result<Json<ApiResponse<TokenResponse>>, AppError> {
    let token = service(&state)
        .login_by_password(&payload.account, &payload.password)
        .await?;
    Ok(ok(token))
}

#[utoipa::path(
    post,
    path = "/login/email",
    tag = "Auth",
    operation_id = "loginByEmail",
    summary = "Log in with an emailed code",
    request_body = EmailLoginRequest,
    responses(
        (status = 200, description = "Login successful", body = ApiResponse<TokenResponse>),
        (status = 422, description = "Wrong or expired code (11006)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(email = %payload.email))]
pub async fn login_by_email(
    State(state): State<AppState>,
    AppJson(payload): AppJson<EmailLoginRequest>,
) -> Result<Json<ApiResponse<TokenResponse>>, AppError> {
    let token = service(&state)
        .login_by_email(&payload.email, &payload.code)
        .await?;
    Ok(ok(token))
}

#[utoipa::path(
    post,
    path = "/register",
    tag = "Auth",
    operation_id = "register",
    summary = "Register a new account",
    description = "Requires a `register` code mailed to the same address. The new account gets the default role.",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "Account created", body = ApiResponse<Empty>),
        (status = 400, description = "Invalid email (11001)", body = ErrorBody),
        (status = 422, description = "Weak password, taken email or wrong code (11009, 11002, 11007)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(email = %payload.email))]
pub async fn register(
    State(state): State<AppState>,
    AppJson(payload): AppJson<RegisterRequest>,
) -> Result<Json<ApiResponse<Empty>>, AppError> {
    service(&state).user_register(payload).await?;
    Ok(ok_message("register success"))
}

#[utoipa::path(
    get,
    path = "/me",
    tag = "Auth",
    operation_id = "getCurrentUser",
    summary = "Get the current user",
    description = "Returns the identity, role ids and permission codes carried by the token.",
    responses(
        (status = 200, description = "Current user", body = ApiResponse<MeResponse>),
        (status = 401, description = "Missing or invalid token", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
pub async fn me(auth_user: AuthUser) -> Json<ApiResponse<MeResponse>> {
    ok(MeResponse::from(auth_user))
}
