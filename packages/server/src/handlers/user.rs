use axum::Json;
use axum::extract::{Path, State};
use tracing::instrument;

use crate::entity::user;
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::{AppJson, AppQuery};
use crate::models::shared::{ApiResponse, Empty, PageInfo, PageQuery, ok, ok_message};
use crate::models::user::{RoleIdsRequest, SysUserFilter, SysUserRequest, SysUserResponse};
use crate::services::sys_user::SysUserService;
use crate::state::AppState;

const PERMISSION: &str = "user:manage";

const SORT_COLUMNS: &[(&str, user::Column)] = &[
    ("id", user::Column::Id),
    ("userName", user::Column::UserName),
    ("loginName", user::Column::LoginName),
    ("email", user::Column::Email),
    ("createdAt", user::Column::CreatedAt),
    ("updatedAt", user::Column::UpdatedAt),
];

fn service(state: &AppState) -> SysUserService<'_> {
    SysUserService::new(&state.db, &state.config.auth)
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Users",
    operation_id = "listUsers",
    summary = "List users",
    description = "Paged listing; each user carries the names of their roles. Sortable by `id` (default), `userName`, `loginName`, `email`, `createdAt`, `updatedAt`.",
    params(PageQuery, SysUserFilter),
    responses(
        (status = 200, description = "One page of users", body = ApiResponse<PageInfo<SysUserResponse>>),
        (status = 400, description = "Invalid paging or sort parameters", body = ErrorBody),
        (status = 401, description = "Missing or invalid token", body = ErrorBody),
        (status = 403, description = "Requires `user:manage`", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, page, filter))]
pub async fn list_users(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppQuery(page): AppQuery<PageQuery>,
    AppQuery(filter): AppQuery<SysUserFilter>,
) -> Result<Json<ApiResponse<PageInfo<SysUserResponse>>>, AppError> {
    auth_user.require_permission(PERMISSION)?;
    let page = page.resolve(SORT_COLUMNS)?;
    let list = service(&state).get_sys_user_list(&filter, &page).await?;
    Ok(ok(list))
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Users",
    operation_id = "createUser",
    summary = "Create a user",
    description = "The account gets a generated login name and the configured default password.",
    request_body = SysUserRequest,
    responses(
        (status = 200, description = "New user", body = ApiResponse<SysUserResponse>),
        (status = 400, description = "Invalid email (11001)", body = ErrorBody),
        (status = 401, description = "Missing or invalid token", body = ErrorBody),
        (status = 403, description = "Requires `user:manage`", body = ErrorBody),
        (status = 422, description = "Email taken (11002)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload))]
pub async fn create_user(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<SysUserRequest>,
) -> Result<Json<ApiResponse<SysUserResponse>>, AppError> {
    auth_user.require_permission(PERMISSION)?;
    let user = service(&state).insert_sys_user(payload).await?;
    Ok(ok(user))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Users",
    operation_id = "getUser",
    summary = "Get a user",
    params(("id" = i32, Path, description = "User ID")),
    responses(
        (status = 200, description = "User", body = ApiResponse<SysUserResponse>),
        (status = 401, description = "Missing or invalid token", body = ErrorBody),
        (status = 403, description = "Requires `user:manage`", body = ErrorBody),
        (status = 404, description = "User does not exist (11012)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user))]
pub async fn get_user(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<SysUserResponse>>, AppError> {
    auth_user.require_permission(PERMISSION)?;
    let user = service(&state).get_user_by_id(id).await?;
    Ok(ok(user))
}

#[utoipa::path(
    put,
    path = "/{id}",
    tag = "Users",
    operation_id = "updateUser",
    summary = "Update a user's profile",
    description = "Absent fields keep their value.",
    params(("id" = i32, Path, description = "User ID")),
    request_body = SysUserRequest,
    responses(
        (status = 200, description = "Updated user", body = ApiResponse<SysUserResponse>),
        (status = 400, description = "Invalid email (11001)", body = ErrorBody),
        (status = 401, description = "Missing or invalid token", body = ErrorBody),
        (status = 403, description = "Requires `user:manage`", body = ErrorBody),
        (status = 404, description = "User does not exist (11012)", body = ErrorBody),
        (status = 422, description = "Email taken (11002)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload))]
pub async fn update_user(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<SysUserRequest>,
) -> Result<Json<ApiResponse<SysUserResponse>>, AppError> {
    auth_user.require_permission(PERMISSION)?;
    let user = service(&state).update_sys_user(id, payload).await?;
    Ok(ok(user))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Users",
    operation_id = "deleteUser",
    summary = "Delete a user",
    params(("id" = i32, Path, description = "User ID")),
    responses(
        (status = 200, description = "User deleted", body = ApiResponse<Empty>),
        (status = 401, description = "Missing or invalid token", body = ErrorBody),
        (status = 403, description = "Requires `user:manage`", body = ErrorBody),
        (status = 404, description = "User does not exist (11012)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user))]
pub async fn delete_user(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<Empty>>, AppError> {
    auth_user.require_permission(PERMISSION)?;
    service(&state).delete_sys_user(id).await?;
    Ok(ok_message("user deleted"))
}

#[utoipa::path(
    get,
    path = "/{id}/roles",
    tag = "Users",
    operation_id = "getUserRoles",
    summary = "List the role ids of a user",
    params(("id" = i32, Path, description = "User ID")),
    responses(
        (status = 200, description = "Role ids", body = ApiResponse<Vec<i32>>),
        (status = 401, description = "Missing or invalid token", body = ErrorBody),
        (status = 403, description = "Requires `user:manage`", body = ErrorBody),
        (status = 404, description = "User does not exist (11012)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user))]
pub async fn get_user_roles(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<Vec<i32>>>, AppError> {
    auth_user.require_permission(PERMISSION)?;
    let ids = service(&state).get_role_ids_by_user_id(id).await?;
    Ok(ok(ids))
}

#[utoipa::path(
    put,
    path = "/{id}/roles",
    tag = "Users",
    operation_id = "setUserRoles",
    summary = "Replace the roles of a user",
    description = "Takes effect at the user's next login.",
    params(("id" = i32, Path, description = "User ID")),
    request_body = RoleIdsRequest,
    responses(
        (status = 200, description = "Roles replaced", body = ApiResponse<Empty>),
        (status = 401, description = "Missing or invalid token", body = ErrorBody),
        (status = 403, description = "Requires `user:manage`", body = ErrorBody),
        (status = 404, description = "User or a role does not exist (11012, 14001)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload))]
pub async fn set_user_roles(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<RoleIdsRequest>,
) -> Result<Json<ApiResponse<Empty>>, AppError> {
    auth_user.require_permission(PERMISSION)?;
    service(&state)
        .update_user_roles(id, &payload.role_ids)
        .await?;
    Ok(ok_message("user roles updated"))
}
