use axum::Json;
use axum::extract::{Path, State};
use tracing::instrument;

use crate::entity::problem;
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::{AppJson, AppQuery};
use crate::models::problem::{
    CheckNumberQuery, EnableRequest, ProblemFilter, ProblemListItem, ProblemRequest,
    ProblemResponse, TemplateQuery,
};
use crate::models::shared::{ApiResponse, Empty, PageInfo, PageQuery, ok, ok_message};
use crate::services::problem::ProblemService;
use crate::state::AppState;

pub(crate) const MANAGE: &str = "problem:manage";
pub(crate) const VIEW: &str = "problem:view";

const SORT_COLUMNS: &[(&str, problem::Column)] = &[
    ("id", problem::Column::Id),
    ("number", problem::Column::Number),
    ("name", problem::Column::Name),
    ("difficulty", problem::Column::Difficulty),
    ("createdAt", problem::Column::CreatedAt),
    ("updatedAt", problem::Column::UpdatedAt),
];

fn service(state: &AppState) -> ProblemService<'_> {
    ProblemService::new(&state.db, &state.config.problem)
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Problems",
    operation_id = "listProblems",
    summary = "List problems (management view)",
    description = "Paged listing over enabled and disabled problems. Sortable by `id` (default), `number`, `name`, `difficulty`, `createdAt`, `updatedAt`.",
    params(PageQuery, ProblemFilter),
    responses(
        (status = 200, description = "One page of problems", body = ApiResponse<PageInfo<ProblemListItem>>),
        (status = 400, description = "Invalid paging or sort parameters", body = ErrorBody),
        (status = 401, description = "Missing or invalid token", body = ErrorBody),
        (status = 403, description = "Requires `problem:manage`", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, page, filter))]
pub async fn list_problems(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppQuery(page): AppQuery<PageQuery>,
    AppQuery(filter): AppQuery<ProblemFilter>,
) -> Result<Json<ApiResponse<PageInfo<ProblemListItem>>>, AppError> {
    auth_user.require_permission(MANAGE)?;
    let page = page.resolve(SORT_COLUMNS)?;
    let list = service(&state).get_problem_list(&filter, &page).await?;
    Ok(ok(list))
}

#[utoipa::path(
    get,
    path = "/public",
    tag = "Problems",
    operation_id = "listPublicProblems",
    summary = "List enabled problems with the caller's progress",
    description = "Only enabled problems are listed, whatever `enable` says. `status` is 0 not started, 1 in progress, 2 solved.",
    params(PageQuery, ProblemFilter),
    responses(
        (status = 200, description = "One page of problems", body = ApiResponse<PageInfo<ProblemListItem>>),
        (status = 400, description = "Invalid paging or sort parameters", body = ErrorBody),
        (status = 401, description = "Missing or invalid token", body = ErrorBody),
        (status = 403, description = "Requires `problem:view`", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, page, filter), fields(user_id = auth_user.user_id))]
pub async fn list_public_problems(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppQuery(page): AppQuery<PageQuery>,
    AppQuery(filter): AppQuery<ProblemFilter>,
) -> Result<Json<ApiResponse<PageInfo<ProblemListItem>>>, AppError> {
    auth_user.require_any_permission(&[VIEW, MANAGE])?;
    let page = page.resolve(SORT_COLUMNS)?;
    let list = service(&state)
        .get_user_problem_list(auth_user.user_id, &filter, &page)
        .await?;
    Ok(ok(list))
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Problems",
    operation_id = "createProblem",
    summary = "Create a problem",
    description = "Absent fields get defaults; the problem starts disabled.",
    request_body = ProblemRequest,
    responses(
        (status = 200, description = "New problem", body = ApiResponse<ProblemResponse>),
        (status = 401, description = "Missing or invalid token", body = ErrorBody),
        (status = 403, description = "Requires `problem:manage`", body = ErrorBody),
        (status = 404, description = "A menu or the description template does not exist (11514, 11509)", body = ErrorBody),
        (status = 422, description = "Number already used (11500)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(user_id = auth_user.user_id))]
pub async fn create_problem(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<ProblemRequest>,
) -> Result<Json<ApiResponse<ProblemResponse>>, AppError> {
    auth_user.require_permission(MANAGE)?;
    let problem = service(&state)
        .insert_problem(auth_user.user_id, payload)
        .await?;
    Ok(ok(problem))
}

#[utoipa::path(
    get,
    path = "/check-number",
    tag = "Problems",
    operation_id = "checkProblemNumber",
    summary = "Check whether a problem number is free",
    params(CheckNumberQuery),
    responses(
        (status = 200, description = "True when the number is free", body = ApiResponse<bool>),
        (status = 401, description = "Missing or invalid token", body = ErrorBody),
        (status = 403, description = "Requires `problem:manage`", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, query), fields(number = %query.number))]
pub async fn check_number(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppQuery(query): AppQuery<CheckNumberQuery>,
) -> Result<Json<ApiResponse<bool>>, AppError> {
    auth_user.require_permission(MANAGE)?;
    let free = service(&state).check_problem_number(&query.number).await?;
    Ok(ok(free))
}

#[utoipa::path(
    get,
    path = "/number/{number}",
    tag = "Problems",
    operation_id = "getProblemByNumber",
    summary = "Get a problem by number",
    params(("number" = String, Path, description = "Problem number")),
    responses(
        (status = 200, description = "Problem", body = ApiResponse<ProblemResponse>),
        (status = 401, description = "Missing or invalid token", body = ErrorBody),
        (status = 403, description = "Requires `problem:view`", body = ErrorBody),
        (status = 404, description = "Problem does not exist (11507)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user))]
pub async fn get_problem_by_number(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(number): Path<String>,
) -> Result<Json<ApiResponse<ProblemResponse>>, AppError> {
    auth_user.require_any_permission(&[VIEW, MANAGE])?;
    let problem = service(&state).get_problem_by_number(&number).await?;
    Ok(ok(problem))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Problems",
    operation_id = "getProblem",
    summary = "Get a problem",
    params(("id" = i32, Path, description = "Problem ID")),
    responses(
        (status = 200, description = "Problem with its menu ids", body = ApiResponse<ProblemResponse>),
        (status = 401, description = "Missing or invalid token", body = ErrorBody),
        (status = 403, description = "Requires `problem:view`", body = ErrorBody),
        (status = 404, description = "Problem does not exist (11507)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user))]
pub async fn get_problem(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<ProblemResponse>>, AppError> {
    auth_user.require_any_permission(&[VIEW, MANAGE])?;
    let problem = service(&state).get_problem_by_id(id).await?;
    Ok(ok(problem))
}

#[utoipa::path(
    put,
    path = "/{id}",
    tag = "Problems",
    operation_id = "updateProblem",
    summary = "Update a problem",
    description = "Absent fields keep their value. `menuIds`, when present, replaces the menu links.",
    params(("id" = i32, Path, description = "Problem ID")),
    request_body = ProblemRequest,
    responses(
        (status = 200, description = "Updated problem", body = ApiResponse<ProblemResponse>),
        (status = 401, description = "Missing or invalid token", body = ErrorBody),
        (status = 403, description = "Requires `problem:manage`", body = ErrorBody),
        (status = 404, description = "Problem or a menu does not exist (11507, 11514)", body = ErrorBody),
        (status = 422, description = "Number already used (11500)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload))]
pub async fn update_problem(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<ProblemRequest>,
) -> Result<Json<ApiResponse<ProblemResponse>>, AppError> {
    auth_user.require_permission(MANAGE)?;
    let problem = service(&state).update_problem(id, payload).await?;
    Ok(ok(problem))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Problems",
    operation_id = "deleteProblem",
    summary = "Delete a problem",
    description = "Deletes the problem's cases and menu links with it.",
    params(("id" = i32, Path, description = "Problem ID")),
    responses(
        (status = 200, description = "Problem deleted", body = ApiResponse<Empty>),
        (status = 401, description = "Missing or invalid token", body = ErrorBody),
        (status = 403, description = "Requires `problem:manage`", body = ErrorBody),
        (status = 404, description = "Problem does not exist (11507)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user))]
pub async fn delete_problem(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<Empty>>, AppError> {
    auth_user.require_permission(MANAGE)?;
    service(&state).delete_problem(id).await?;
    Ok(ok_message("problem deleted"))
}

#[utoipa::path(
    put,
    path = "/{id}/enable",
    tag = "Problems",
    operation_id = "setProblemEnable",
    summary = "Enable or disable a problem",
    params(("id" = i32, Path, description = "Problem ID")),
    request_body = EnableRequest,
    responses(
        (status = 200, description = "Flag updated", body = ApiResponse<Empty>),
        (status = 400, description = "enable must be -1 or 1", body = ErrorBody),
        (status = 401, description = "Missing or invalid token", body = ErrorBody),
        (status = 403, description = "Requires `problem:manage`", body = ErrorBody),
        (status = 404, description = "Problem does not exist (11507)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(enable = payload.enable))]
pub async fn set_enable(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<EnableRequest>,
) -> Result<Json<ApiResponse<Empty>>, AppError> {
    auth_user.require_permission(MANAGE)?;
    service(&state)
        .update_problem_enable(id, payload.enable)
        .await?;
    Ok(ok_message("problem updated"))
}

#[utoipa::path(
    get,
    path = "/{id}/template",
    tag = "Problems",
    operation_id = "getProblemTemplate",
    summary = "Get starter code",
    description = "Returns the starter code for `language`, which must be one of the problem's languages.",
    params(
        ("id" = i32, Path, description = "Problem ID"),
        TemplateQuery,
    ),
    responses(
        (status = 200, description = "Starter code", body = ApiResponse<String>),
        (status = 401, description = "Missing or invalid token", body = ErrorBody),
        (status = 403, description = "Requires `problem:view`", body = ErrorBody),
        (status = 404, description = "Problem or template does not exist (11507, 11509)", body = ErrorBody),
        (status = 422, description = "Language not supported (12503)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, query), fields(language = %query.language))]
pub async fn get_template(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppQuery(query): AppQuery<TemplateQuery>,
) -> Result<Json<ApiResponse<String>>, AppError> {
    auth_user.require_any_permission(&[VIEW, MANAGE])?;
    let code = service(&state)
        .get_problem_template_code(id, &query.language)
        .await?;
    Ok(ok(code))
}
