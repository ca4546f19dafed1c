use axum::Json;
use axum::extract::{Multipart, Path, State};
use axum::response::Response;
use tracing::instrument;

use super::problem::{MANAGE, VIEW};
use crate::entity::problem_menu;
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::{AppJson, AppQuery};
use crate::models::problem_menu::{
    DeleteMenuQuery, ProblemMenuFilter, ProblemMenuListItem, ProblemMenuRequest,
    ProblemMenuResponse,
};
use crate::models::shared::{ApiResponse, Empty, PageInfo, PageQuery, SimpleItem, ok, ok_message};
use crate::services::problem_menu::ProblemMenuService;
use crate::state::AppState;

const SORT_COLUMNS: &[(&str, problem_menu::Column)] = &[
    ("id", problem_menu::Column::Id),
    ("name", problem_menu::Column::Name),
    ("createdAt", problem_menu::Column::CreatedAt),
    ("updatedAt", problem_menu::Column::UpdatedAt),
];

fn service(state: &AppState) -> ProblemMenuService<'_> {
    ProblemMenuService::new(&state.db, state.storage.as_ref(), &state.config)
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Problem Menus",
    operation_id = "listProblemMenus",
    summary = "List problem menus",
    description = "Each menu carries its problem count and creator name. Sortable by `id` (default), `name`, `createdAt`, `updatedAt`.",
    params(PageQuery, ProblemMenuFilter),
    responses(
        (status = 200, description = "One page of menus", body = ApiResponse<PageInfo<ProblemMenuListItem>>),
        (status = 400, description = "Invalid paging or sort parameters", body = ErrorBody),
        (status = 401, description = "Missing or invalid token", body = ErrorBody),
        (status = 403, description = "Requires `problem:view`", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, page, filter))]
pub async fn list_menus(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppQuery(page): AppQuery<PageQuery>,
    AppQuery(filter): AppQuery<ProblemMenuFilter>,
) -> Result<Json<ApiResponse<PageInfo<ProblemMenuListItem>>>, AppError> {
    auth_user.require_any_permission(&[VIEW, MANAGE])?;
    let page = page.resolve(SORT_COLUMNS)?;
    let list = service(&state).get_problem_menu_list(&filter, &page).await?;
    Ok(ok(list))
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Problem Menus",
    operation_id = "createProblemMenu",
    summary = "Create a problem menu",
    request_body = ProblemMenuRequest,
    responses(
        (status = 200, description = "New menu", body = ApiResponse<ProblemMenuResponse>),
        (status = 401, description = "Missing or invalid token", body = ErrorBody),
        (status = 403, description = "Requires `problem:manage`", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(user_id = auth_user.user_id))]
pub async fn create_menu(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<ProblemMenuRequest>,
) -> Result<Json<ApiResponse<ProblemMenuResponse>>, AppError> {
    auth_user.require_permission(MANAGE)?;
    let menu = service(&state)
        .insert_problem_menu(auth_user.user_id, payload)
        .await?;
    Ok(ok(menu))
}

#[utoipa::path(
    get,
    path = "/all",
    tag = "Problem Menus",
    operation_id = "listAllProblemMenus",
    summary = "List every problem menu",
    responses(
        (status = 200, description = "All menus", body = ApiResponse<Vec<ProblemMenuResponse>>),
        (status = 401, description = "Missing or invalid token", body = ErrorBody),
        (status = 403, description = "Requires `problem:view`", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
pub async fn list_all_menus(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<ProblemMenuResponse>>>, AppError> {
    auth_user.require_any_permission(&[VIEW, MANAGE])?;
    let menus = service(&state).get_all_problem_menu().await?;
    Ok(ok(menus))
}

#[utoipa::path(
    get,
    path = "/simple",
    tag = "Problem Menus",
    operation_id = "listSimpleProblemMenus",
    summary = "List every problem menu as `{id, name}`",
    responses(
        (status = 200, description = "All menus", body = ApiResponse<Vec<SimpleItem>>),
        (status = 401, description = "Missing or invalid token", body = ErrorBody),
        (status = 403, description = "Requires `problem:view`", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
pub async fn list_simple_menus(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<SimpleItem>>>, AppError> {
    auth_user.require_any_permission(&[VIEW, MANAGE])?;
    let menus = service(&state).get_simple_problem_menu_list().await?;
    Ok(ok(menus))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Problem Menus",
    operation_id = "getProblemMenu",
    summary = "Get a problem menu",
    params(("id" = i32, Path, description = "Menu ID")),
    responses(
        (status = 200, description = "Menu", body = ApiResponse<ProblemMenuResponse>),
        (status = 401, description = "Missing or invalid token", body = ErrorBody),
        (status = 403, description = "Requires `problem:view`", body = ErrorBody),
        (status = 404, description = "Menu does not exist (11514)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user))]
pub async fn get_menu(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<ProblemMenuResponse>>, AppError> {
    auth_user.require_any_permission(&[VIEW, MANAGE])?;
    let menu = service(&state).get_problem_menu_by_id(id).await?;
    Ok(ok(menu))
}

#[utoipa::path(
    put,
    path = "/{id}",
    tag = "Problem Menus",
    operation_id = "updateProblemMenu",
    summary = "Update a problem menu",
    description = "Absent fields keep their value. The creator never changes.",
    params(("id" = i32, Path, description = "Menu ID")),
    request_body = ProblemMenuRequest,
    responses(
        (status = 200, description = "Updated menu", body = ApiResponse<ProblemMenuResponse>),
        (status = 401, description = "Missing or invalid token", body = ErrorBody),
        (status = 403, description = "Requires `problem:manage`", body = ErrorBody),
        (status = 404, description = "Menu does not exist (11514)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload))]
pub async fn update_menu(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<ProblemMenuRequest>,
) -> Result<Json<ApiResponse<ProblemMenuResponse>>, AppError> {
    auth_user.require_permission(MANAGE)?;
    let menu = service(&state).update_problem_menu(id, payload).await?;
    Ok(ok(menu))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Problem Menus",
    operation_id = "deleteProblemMenu",
    summary = "Delete a problem menu",
    description = "A menu that still holds problems is refused unless `force=true`, which unlinks them first.",
    params(("id" = i32, Path, description = "Menu ID"), DeleteMenuQuery),
    responses(
        (status = 200, description = "Menu deleted", body = ApiResponse<Empty>),
        (status = 401, description = "Missing or invalid token", body = ErrorBody),
        (status = 403, description = "Requires `problem:manage`", body = ErrorBody),
        (status = 404, description = "Menu does not exist (11514)", body = ErrorBody),
        (status = 422, description = "Menu is not empty (11513)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, query), fields(force = query.force))]
pub async fn delete_menu(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppQuery(query): AppQuery<DeleteMenuQuery>,
) -> Result<Json<ApiResponse<Empty>>, AppError> {
    auth_user.require_permission(MANAGE)?;
    service(&state).delete_problem_menu(id, query.force).await?;
    Ok(ok_message("problem menu deleted"))
}

#[utoipa::path(
    post,
    path = "/icon",
    tag = "Problem Menus",
    operation_id = "uploadProblemMenuIcon",
    summary = "Upload a menu icon",
    description = "Stores the `file` multipart field and returns its public URL.",
    request_body(content_type = "multipart/form-data", description = "Image in the `file` field"),
    responses(
        (status = 200, description = "Public URL of the icon", body = ApiResponse<String>),
        (status = 400, description = "Missing, empty or oversized file", body = ErrorBody),
        (status = 401, description = "Missing or invalid token", body = ErrorBody),
        (status = 403, description = "Requires `problem:manage`", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, multipart))]
pub async fn upload_icon(
    auth_user: AuthUser,
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<ApiResponse<String>>, AppError> {
    auth_user.require_permission(MANAGE)?;
    let upload = super::read_upload(multipart).await?;
    let url = service(&state)
        .upload_problem_menu_icon(&upload.file_name, &upload.bytes)
        .await?;
    Ok(ok(url))
}

#[utoipa::path(
    get,
    path = "/icon/{name}",
    tag = "Problem Menus",
    operation_id = "readProblemMenuIcon",
    summary = "Fetch a menu icon",
    params(("name" = String, Path, description = "Object name returned by the upload")),
    responses(
        (status = 200, description = "Image bytes"),
        (status = 400, description = "Invalid name", body = ErrorBody),
        (status = 404, description = "No such icon (11511)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn read_icon(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Response, AppError> {
    let object = service(&state).read_problem_menu_icon(&name).await?;
    super::object_response(object)
}
