use axum::Json;
use axum::extract::{Multipart, Path, State};
use axum::response::Response;
use tracing::instrument;

use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::account::{AccountInfoResponse, ChangePasswordRequest, UpdateAccountRequest};
use crate::models::shared::{ApiResponse, Empty, ok, ok_message};
use crate::services::account::AccountService;
use crate::state::AppState;

fn service(state: &AppState) -> AccountService<'_> {
    AccountService::new(
        &state.db,
        state.storage.as_ref(),
        state.mailer.as_ref(),
        &state.config,
    )
}

#[utoipa::path(
    get,
    path = "/info",
    tag = "Account",
    operation_id = "getAccountInfo",
    summary = "Get own profile",
    responses(
        (status = 200, description = "Profile", body = ApiResponse<AccountInfoResponse>),
        (status = 401, description = "Missing or invalid token", body = ErrorBody),
        (status = 404, description = "Account deleted (11012)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn get_info(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<AccountInfoResponse>>, AppError> {
    let info = service(&state).get_account_info(auth_user.user_id).await?;
    Ok(ok(info))
}

#[utoipa::path(
    put,
    path = "/info",
    tag = "Account",
    operation_id = "updateAccountInfo",
    summary = "Update own profile",
    description = "Absent fields keep their value. Login name and password cannot be changed here.",
    request_body = UpdateAccountRequest,
    responses(
        (status = 200, description = "Updated profile", body = ApiResponse<AccountInfoResponse>),
        (status = 400, description = "Invalid email (11001)", body = ErrorBody),
        (status = 401, description = "Missing or invalid token", body = ErrorBody),
        (status = 422, description = "Email taken (11002)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(user_id = auth_user.user_id))]
pub async fn update_info(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<UpdateAccountRequest>,
) -> Result<Json<ApiResponse<AccountInfoResponse>>, AppError> {
    let info = service(&state)
        .update_account_info(auth_user.user_id, payload)
        .await?;
    Ok(ok(info))
}

#[utoipa::path(
    post,
    path = "/password",
    tag = "Account",
    operation_id = "changePassword",
    summary = "Change own password",
    request_body = ChangePasswordRequest,
    responses(
        (status = 200, description = "Password changed", body = ApiResponse<Empty>),
        (status = 401, description = "Missing or invalid token", body = ErrorBody),
        (status = 422, description = "Wrong old password or weak new one (11000, 11009)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(user_id = auth_user.user_id))]
pub async fn change_password(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<ChangePasswordRequest>,
) -> Result<Json<ApiResponse<Empty>>, AppError> {
    service(&state)
        .change_password(
            auth_user.user_id,
            &payload.old_password,
            &payload.new_password,
        )
        .await?;
    Ok(ok_message("password changed"))
}

#[utoipa::path(
    post,
    path = "/password/reset",
    tag = "Account",
    operation_id = "resetPassword",
    summary = "Reset own password",
    description = "Generates a random password and mails it to the account's address. Nothing changes if the mail cannot be sent.",
    responses(
        (status = 200, description = "New password mailed", body = ApiResponse<Empty>),
        (status = 401, description = "Missing or invalid token", body = ErrorBody),
        (status = 500, description = "Mail delivery failed", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn reset_password(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Empty>>, AppError> {
    service(&state).reset_password(auth_user.user_id).await?;
    Ok(ok_message("new password sent to your email"))
}

#[utoipa::path(
    post,
    path = "/avatar",
    tag = "Account",
    operation_id = "uploadAvatar",
    summary = "Upload an avatar image",
    description = "Stores the `file` multipart field and returns its public URL. Set it on the profile with `PUT /account/info`.",
    request_body(content_type = "multipart/form-data", description = "Image in the `file` field"),
    responses(
        (status = 200, description = "Public URL of the image", body = ApiResponse<String>),
        (status = 400, description = "Missing, empty or oversized file", body = ErrorBody),
        (status = 401, description = "Missing or invalid token", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, multipart), fields(user_id = auth_user.user_id))]
pub async fn upload_avatar(
    auth_user: AuthUser,
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<ApiResponse<String>>, AppError> {
    let upload = super::read_upload(multipart).await?;
    let url = service(&state)
        .upload_avatar(&upload.file_name, &upload.bytes)
        .await?;
    Ok(ok(url))
}

#[utoipa::path(
    get,
    path = "/avatar/{name}",
    tag = "Account",
    operation_id = "readAvatar",
    summary = "Fetch an avatar image",
    params(("name" = String, Path, description = "Object name returned by the upload")),
    responses(
        (status = 200, description = "Image bytes"),
        (status = 400, description = "Invalid name", body = ErrorBody),
        (status = 404, description = "No such image (11511)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn read_avatar(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Response, AppError> {
    let object = service(&state).read_avatar(&name).await?;
    super::object_response(object)
}
