use axum::Json;
use axum::extract::{Path, State};
use tracing::instrument;

use crate::entity::role;
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::{AppJson, AppQuery};
use crate::models::permission::PermissionResponse;
use crate::models::role::{PermissionIdsRequest, RoleFilter, RoleRequest, RoleResponse};
use crate::models::shared::{ApiResponse, Empty, PageInfo, PageQuery, SimpleItem, ok, ok_message};
use crate::services::role::RoleService;
use crate::state::AppState;

const PERMISSION: &str = "role:manage";

const SORT_COLUMNS: &[(&str, role::Column)] = &[
    ("id", role::Column::Id),
    ("name", role::Column::Name),
    ("createdAt", role::Column::CreatedAt),
    ("updatedAt", role::Column::UpdatedAt),
];

#[utoipa::path(
    get,
    path = "/",
    tag = "Roles",
    operation_id = "listRoles",
    summary = "List roles",
    description = "Paged listing filtered by name and description substrings. Sortable by `id` (default), `name`, `createdAt`, `updatedAt`.",
    params(PageQuery, RoleFilter),
    responses(
        (status = 200, description = "One page of roles", body = ApiResponse<PageInfo<RoleResponse>>),
        (status = 400, description = "Invalid paging or sort parameters", body = ErrorBody),
        (status = 401, description = "Missing or invalid token", body = ErrorBody),
        (status = 403, description = "Requires `role:manage`", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, page, filter))]
pub async fn list_roles(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppQuery(page): AppQuery<PageQuery>,
    AppQuery(filter): AppQuery<RoleFilter>,
) -> Result<Json<ApiResponse<PageInfo<RoleResponse>>>, AppError> {
    auth_user.require_permission(PERMISSION)?;
    let page = page.resolve(SORT_COLUMNS)?;
    let list = RoleService::new(&state.db)
        .get_role_list(&filter, &page)
        .await?;
    Ok(ok(list))
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Roles",
    operation_id = "createRole",
    summary = "Create a role",
    request_body = RoleRequest,
    responses(
        (status = 200, description = "New role", body = ApiResponse<RoleResponse>),
        (status = 400, description = "Name must be 1-64 characters", body = ErrorBody),
        (status = 401, description = "Missing or invalid token", body = ErrorBody),
        (status = 403, description = "Requires `role:manage`", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(name = %payload.name))]
pub async fn create_role(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<RoleRequest>,
) -> Result<Json<ApiResponse<RoleResponse>>, AppError> {
    auth_user.require_permission(PERMISSION)?;
    let role = RoleService::new(&state.db).insert_role(payload).await?;
    Ok(ok(role))
}

#[utoipa::path(
    get,
    path = "/simple",
    tag = "Roles",
    operation_id = "listSimpleRoles",
    summary = "List all roles as `{id, name}`",
    responses(
        (status = 200, description = "All roles", body = ApiResponse<Vec<SimpleItem>>),
        (status = 401, description = "Missing or invalid token", body = ErrorBody),
        (status = 403, description = "Requires `role:manage`", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
pub async fn list_simple_roles(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<SimpleItem>>>, AppError> {
    auth_user.require_permission(PERMISSION)?;
    let roles = RoleService::new(&state.db).get_simple_role_list().await?;
    Ok(ok(roles))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Roles",
    operation_id = "getRole",
    summary = "Get a role",
    params(("id" = i32, Path, description = "Role ID")),
    responses(
        (status = 200, description = "Role", body = ApiResponse<RoleResponse>),
        (status = 401, description = "Missing or invalid token", body = ErrorBody),
        (status = 403, description = "Requires `role:manage`", body = ErrorBody),
        (status = 404, description = "Role does not exist (14001)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user))]
pub async fn get_role(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<RoleResponse>>, AppError> {
    auth_user.require_permission(PERMISSION)?;
    let role = RoleService::new(&state.db).get_role_by_id(id).await?;
    Ok(ok(role))
}

#[utoipa::path(
    put,
    path = "/{id}",
    tag = "Roles",
    operation_id = "updateRole",
    summary = "Rename or describe a role",
    params(("id" = i32, Path, description = "Role ID")),
    request_body = RoleRequest,
    responses(
        (status = 200, description = "Updated role", body = ApiResponse<RoleResponse>),
        (status = 400, description = "Name must be 1-64 characters", body = ErrorBody),
        (status = 401, description = "Missing or invalid token", body = ErrorBody),
        (status = 403, description = "Requires `role:manage`", body = ErrorBody),
        (status = 404, description = "Role does not exist (14001)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload))]
pub async fn update_role(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<RoleRequest>,
) -> Result<Json<ApiResponse<RoleResponse>>, AppError> {
    auth_user.require_permission(PERMISSION)?;
    let role = RoleService::new(&state.db).update_role(id, payload).await?;
    Ok(ok(role))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Roles",
    operation_id = "deleteRole",
    summary = "Delete a role",
    description = "Also removes the role from every user and drops its permission grants.",
    params(("id" = i32, Path, description = "Role ID")),
    responses(
        (status = 200, description = "Role deleted", body = ApiResponse<Empty>),
        (status = 401, description = "Missing or invalid token", body = ErrorBody),
        (status = 403, description = "Requires `role:manage`", body = ErrorBody),
        (status = 404, description = "Role does not exist (14001)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user))]
pub async fn delete_role(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<Empty>>, AppError> {
    auth_user.require_permission(PERMISSION)?;
    RoleService::new(&state.db).delete_role(id).await?;
    Ok(ok_message("role deleted"))
}

#[utoipa::path(
    get,
    path = "/{id}/permissions",
    tag = "Roles",
    operation_id = "getRolePermissions",
    summary = "List the permissions granted to a role",
    params(("id" = i32, Path, description = "Role ID")),
    responses(
        (status = 200, description = "Granted permissions", body = ApiResponse<Vec<PermissionResponse>>),
        (status = 401, description = "Missing or invalid token", body = ErrorBody),
        (status = 403, description = "Requires `role:manage`", body = ErrorBody),
        (status = 404, description = "Role does not exist (14001)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user))]
pub async fn get_role_permissions(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<Vec<PermissionResponse>>>, AppError> {
    auth_user.require_permission(PERMISSION)?;
    let permissions = RoleService::new(&state.db)
        .get_permissions_by_role_id(id)
        .await?;
    Ok(ok(permissions))
}

#[utoipa::path(
    put,
    path = "/{id}/permissions",
    tag = "Roles",
    operation_id = "setRolePermissions",
    summary = "Replace a role's permission grants",
    description = "The given list replaces the current grants. An empty list revokes everything.",
    params(("id" = i32, Path, description = "Role ID")),
    request_body = PermissionIdsRequest,
    responses(
        (status = 200, description = "Grants replaced", body = ApiResponse<Empty>),
        (status = 401, description = "Missing or invalid token", body = ErrorBody),
        (status = 403, description = "Requires `role:manage`", body = ErrorBody),
        (status = 404, description = "Role or a permission does not exist (14001, 13001)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload))]
pub async fn set_role_permissions(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<PermissionIdsRequest>,
) -> Result<Json<ApiResponse<Empty>>, AppError> {
    auth_user.require_permission(PERMISSION)?;
    RoleService::new(&state.db)
        .update_role_permissions(id, &payload.permission_ids)
        .await?;
    Ok(ok_message("role permissions updated"))
}

#[utoipa::path(
    get,
    path = "/{id}/permission-ids",
    tag = "Roles",
    operation_id = "getRolePermissionIds",
    summary = "List the permission ids granted to a role",
    params(("id" = i32, Path, description = "Role ID")),
    responses(
        (status = 200, description = "Granted permission ids", body = ApiResponse<Vec<i32>>),
        (status = 401, description = "Missing or invalid token", body = ErrorBody),
        (status = 403, description = "Requires `role:manage`", body = ErrorBody),
        (status = 404, description = "Role does not exist (14001)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user))]
pub async fn get_role_permission_ids(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<Vec<i32>>>, AppError> {
    auth_user.require_permission(PERMISSION)?;
    let ids = RoleService::new(&state.db)
        .get_permission_ids_by_role_id(id)
        .await?;
    Ok(ok(ids))
}
