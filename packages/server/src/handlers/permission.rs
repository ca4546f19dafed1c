use axum::Json;
use axum::extract::{Path, State};
use tracing::instrument;

use crate::entity::permission;
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::{AppJson, AppQuery};
use crate::models::permission::{
    PermissionFilter, PermissionRequest, PermissionResponse, PermissionTreeNode,
};
use crate::models::shared::{ApiResponse, PageInfo, PageQuery, ok};
use crate::services::permission::PermissionService;
use crate::state::AppState;

const PERMISSION: &str = "permission:manage";

const SORT_COLUMNS: &[(&str, permission::Column)] = &[
    ("id", permission::Column::Id),
    ("code", permission::Column::Code),
    ("name", permission::Column::Name),
    ("createdAt", permission::Column::CreatedAt),
    ("updatedAt", permission::Column::UpdatedAt),
];

#[utoipa::path(
    get,
    path = "/",
    tag = "Permissions",
    operation_id = "listPermissions",
    summary = "List permissions",
    description = "Paged listing. `keyword` is a substring of the code. Sortable by `id` (default), `code`, `name`, `createdAt`, `updatedAt`.",
    params(PageQuery, PermissionFilter),
    responses(
        (status = 200, description = "One page of permissions", body = ApiResponse<PageInfo<PermissionResponse>>),
        (status = 400, description = "Invalid paging or sort parameters", body = ErrorBody),
        (status = 401, description = "Missing or invalid token", body = ErrorBody),
        (status = 403, description = "Requires `permission:manage`", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, page, filter))]
pub async fn list_permissions(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppQuery(page): AppQuery<PageQuery>,
    AppQuery(filter): AppQuery<PermissionFilter>,
) -> Result<Json<ApiResponse<PageInfo<PermissionResponse>>>, AppError> {
    auth_user.require_permission(PERMISSION)?;
    let page = page.resolve(SORT_COLUMNS)?;
    let list = PermissionService::new(&state.db)
        .get_permission_list(filter.keyword.as_deref(), &page)
        .await?;
    Ok(ok(list))
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Permissions",
    operation_id = "createPermission",
    summary = "Create a permission",
    description = "`parentId` 0 makes a root. Returns the new id.",
    request_body = PermissionRequest,
    responses(
        (status = 200, description = "Id of the new permission", body = ApiResponse<i32>),
        (status = 400, description = "Missing code", body = ErrorBody),
        (status = 401, description = "Missing or invalid token", body = ErrorBody),
        (status = 403, description = "Requires `permission:manage`", body = ErrorBody),
        (status = 404, description = "Parent does not exist (13001)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload))]
pub async fn create_permission(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<PermissionRequest>,
) -> Result<Json<ApiResponse<i32>>, AppError> {
    auth_user.require_permission(PERMISSION)?;
    let id = PermissionService::new(&state.db)
        .insert_permission(payload)
        .await?;
    Ok(ok(id))
}

#[utoipa::path(
    get,
    path = "/tree",
    tag = "Permissions",
    operation_id = "getPermissionTree",
    summary = "Get the permission forest",
    responses(
        (status = 200, description = "Root permissions with nested children", body = ApiResponse<Vec<PermissionTreeNode>>),
        (status = 401, description = "Missing or invalid token", body = ErrorBody),
        (status = 403, description = "Requires `permission:manage`", body = ErrorBody),
        (status = 500, description = "Dangling parent or cycle in the data (13000)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user))]
pub async fn get_tree(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<PermissionTreeNode>>>, AppError> {
    auth_user.require_permission(PERMISSION)?;
    let tree = PermissionService::new(&state.db)
        .get_permission_tree()
        .await?;
    Ok(ok(tree))
}

#[utoipa::path(
    get,
    path = "/count",
    tag = "Permissions",
    operation_id = "countPermissions",
    summary = "Count permissions",
    responses(
        (status = 200, description = "Number of live permissions", body = ApiResponse<u64>),
        (status = 401, description = "Missing or invalid token", body = ErrorBody),
        (status = 403, description = "Requires `permission:manage`", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
pub async fn count_permissions(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<u64>>, AppError> {
    auth_user.require_permission(PERMISSION)?;
    let count = PermissionService::new(&state.db)
        .get_permission_count()
        .await?;
    Ok(ok(count))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Permissions",
    operation_id = "getPermission",
    summary = "Get a permission",
    params(("id" = i32, Path, description = "Permission ID")),
    responses(
        (status = 200, description = "Permission", body = ApiResponse<PermissionResponse>),
        (status = 401, description = "Missing or invalid token", body = ErrorBody),
        (status = 403, description = "Requires `permission:manage`", body = ErrorBody),
        (status = 404, description = "Permission does not exist (13001)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user))]
pub async fn get_permission(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<PermissionResponse>>, AppError> {
    auth_user.require_permission(PERMISSION)?;
    let item = PermissionService::new(&state.db)
        .get_permission_by_id(id)
        .await?;
    Ok(ok(item))
}

#[utoipa::path(
    put,
    path = "/{id}",
    tag = "Permissions",
    operation_id = "updatePermission",
    summary = "Update a permission",
    description = "Absent fields keep their value. A permission cannot be its own parent.",
    params(("id" = i32, Path, description = "Permission ID")),
    request_body = PermissionRequest,
    responses(
        (status = 200, description = "Updated permission", body = ApiResponse<PermissionResponse>),
        (status = 400, description = "Invalid parent", body = ErrorBody),
        (status = 401, description = "Missing or invalid token", body = ErrorBody),
        (status = 403, description = "Requires `permission:manage`", body = ErrorBody),
        (status = 404, description = "Permission or parent does not exist (13001)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload))]
pub async fn update_permission(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<PermissionRequest>,
) -> Result<Json<ApiResponse<PermissionResponse>>, AppError> {
    auth_user.require_permission(PERMISSION)?;
    let item = PermissionService::new(&state.db)
        .update_permission(id, payload)
        .await?;
    Ok(ok(item))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Permissions",
    operation_id = "deletePermission",
    summary = "Delete a permission and its subtree",
    description = "Deletes descendants first and revokes every deleted permission from all roles. Returns the deleted ids in deletion order.",
    params(("id" = i32, Path, description = "Permission ID")),
    responses(
        (status = 200, description = "Deleted ids", body = ApiResponse<Vec<i32>>),
        (status = 401, description = "Missing or invalid token", body = ErrorBody),
        (status = 403, description = "Requires `permission:manage`", body = ErrorBody),
        (status = 404, description = "Permission does not exist (13001)", body = ErrorBody),
        (status = 500, description = "Cycle or excessive depth (13000)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user))]
pub async fn delete_permission(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<Vec<i32>>>, AppError> {
    auth_user.require_permission(PERMISSION)?;
    let deleted = PermissionService::new(&state.db)
        .delete_permission_by_id(id)
        .await?;
    Ok(ok(deleted))
}

#[utoipa::path(
    get,
    path = "/{id}/children",
    tag = "Permissions",
    operation_id = "getChildPermissions",
    summary = "List direct children",
    params(("id" = i32, Path, description = "Parent permission ID; 0 lists roots")),
    responses(
        (status = 200, description = "Direct children", body = ApiResponse<Vec<PermissionResponse>>),
        (status = 401, description = "Missing or invalid token", body = ErrorBody),
        (status = 403, description = "Requires `permission:manage`", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user))]
pub async fn get_children(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<Vec<PermissionResponse>>>, AppError> {
    auth_user.require_permission(PERMISSION)?;
    let children = PermissionService::new(&state.db)
        .get_child_permissions(id)
        .await?;
    Ok(ok(children))
}
