use axum::Json;
use axum::extract::{Path, State};
use tracing::instrument;

use super::problem::MANAGE;
use crate::entity::problem_case;
use crate::error::{AppError, BusError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::{AppJson, AppQuery};
use crate::models::problem_case::{
    CheckCaseNameQuery, ProblemCaseFilter, ProblemCaseRequest, ProblemCaseResponse,
};
use crate::models::shared::{ApiResponse, Empty, PageInfo, PageQuery, ok, ok_message};
use crate::services::problem_case::ProblemCaseService;
use crate::state::AppState;

const SORT_COLUMNS: &[(&str, problem_case::Column)] = &[
    ("id", problem_case::Column::Id),
    ("caseName", problem_case::Column::CaseName),
    ("createdAt", problem_case::Column::CreatedAt),
    ("updatedAt", problem_case::Column::UpdatedAt),
];

/// Load a case and make sure it belongs to `problem_id`.
async fn owned_case(
    service: &ProblemCaseService<'_>,
    problem_id: i32,
    case_id: i32,
) -> Result<ProblemCaseResponse, AppError> {
    let case = service.get_problem_case_by_id(case_id).await?;
    if case.problem_id != problem_id {
        return Err(BusError::ProblemCaseNotExist.into());
    }
    Ok(case)
}

#[utoipa::path(
    get,
    path = "/{id}/cases",
    tag = "Problem Cases",
    operation_id = "listProblemCases",
    summary = "List a problem's cases",
    description = "Sortable by `id` (default), `caseName`, `createdAt`, `updatedAt`.",
    params(("id" = i32, Path, description = "Problem ID"), PageQuery, ProblemCaseFilter),
    responses(
        (status = 200, description = "One page of cases", body = ApiResponse<PageInfo<ProblemCaseResponse>>),
        (status = 400, description = "Invalid paging or sort parameters", body = ErrorBody),
        (status = 401, description = "Missing or invalid token", body = ErrorBody),
        (status = 403, description = "Requires `problem:manage`", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, page, filter))]
pub async fn list_cases(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(problem_id): Path<i32>,
    AppQuery(page): AppQuery<PageQuery>,
    AppQuery(mut filter): AppQuery<ProblemCaseFilter>,
) -> Result<Json<ApiResponse<PageInfo<ProblemCaseResponse>>>, AppError> {
    auth_user.require_permission(MANAGE)?;
    let page = page.resolve(SORT_COLUMNS)?;
    filter.problem_id = problem_id;
    let list = ProblemCaseService::new(&state.db)
        .get_problem_case_list(&filter, &page)
        .await?;
    Ok(ok(list))
}

#[utoipa::path(
    post,
    path = "/{id}/cases",
    tag = "Problem Cases",
    operation_id = "createProblemCase",
    summary = "Add a case to a problem",
    description = "An empty or absent `caseName` gets the next generated name.",
    params(("id" = i32, Path, description = "Problem ID")),
    request_body = ProblemCaseRequest,
    responses(
        (status = 200, description = "New case", body = ApiResponse<ProblemCaseResponse>),
        (status = 401, description = "Missing or invalid token", body = ErrorBody),
        (status = 403, description = "Requires `problem:manage`", body = ErrorBody),
        (status = 404, description = "Problem does not exist (11507)", body = ErrorBody),
        (status = 422, description = "Name already used in this problem (11512)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload))]
pub async fn create_case(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(problem_id): Path<i32>,
    AppJson(payload): AppJson<ProblemCaseRequest>,
) -> Result<Json<ApiResponse<ProblemCaseResponse>>, AppError> {
    auth_user.require_permission(MANAGE)?;
    let case = ProblemCaseService::new(&state.db)
        .insert_problem_case(problem_id, payload)
        .await?;
    Ok(ok(case))
}

#[utoipa::path(
    get,
    path = "/{id}/cases/new-name",
    tag = "Problem Cases",
    operation_id = "generateProblemCaseName",
    summary = "Suggest the next case name",
    description = "Increments the numeric suffix of the newest name, or returns `1` for a problem without cases.",
    params(("id" = i32, Path, description = "Problem ID")),
    responses(
        (status = 200, description = "Suggested name", body = ApiResponse<String>),
        (status = 401, description = "Missing or invalid token", body = ErrorBody),
        (status = 403, description = "Requires `problem:manage`", body = ErrorBody),
        (status = 500, description = "Newest name has no numeric suffix (5000)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user))]
pub async fn new_case_name(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(problem_id): Path<i32>,
) -> Result<Json<ApiResponse<String>>, AppError> {
    auth_user.require_permission(MANAGE)?;
    let name = ProblemCaseService::new(&state.db)
        .generate_new_problem_case_name(problem_id)
        .await?;
    Ok(ok(name))
}

#[utoipa::path(
    get,
    path = "/{id}/cases/check-name",
    tag = "Problem Cases",
    operation_id = "checkProblemCaseName",
    summary = "Check whether a case name is free",
    params(("id" = i32, Path, description = "Problem ID"), CheckCaseNameQuery),
    responses(
        (status = 200, description = "True when the name can be used", body = ApiResponse<bool>),
        (status = 401, description = "Missing or invalid token", body = ErrorBody),
        (status = 403, description = "Requires `problem:manage`", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, query), fields(name = %query.name))]
pub async fn check_case_name(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(problem_id): Path<i32>,
    AppQuery(query): AppQuery<CheckCaseNameQuery>,
) -> Result<Json<ApiResponse<bool>>, AppError> {
    auth_user.require_permission(MANAGE)?;
    let free = ProblemCaseService::new(&state.db)
        .check_problem_case_name(query.id, &query.name, problem_id)
        .await?;
    Ok(ok(free))
}

#[utoipa::path(
    get,
    path = "/{id}/cases/{case_id}",
    tag = "Problem Cases",
    operation_id = "getProblemCase",
    summary = "Get a case",
    params(
        ("id" = i32, Path, description = "Problem ID"),
        ("case_id" = i32, Path, description = "Case ID"),
    ),
    responses(
        (status = 200, description = "Case", body = ApiResponse<ProblemCaseResponse>),
        (status = 401, description = "Missing or invalid token", body = ErrorBody),
        (status = 403, description = "Requires `problem:manage`", body = ErrorBody),
        (status = 404, description = "Case does not exist in this problem (11515)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user))]
pub async fn get_case(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path((problem_id, case_id)): Path<(i32, i32)>,
) -> Result<Json<ApiResponse<ProblemCaseResponse>>, AppError> {
    auth_user.require_permission(MANAGE)?;
    let service = ProblemCaseService::new(&state.db);
    let case = owned_case(&service, problem_id, case_id).await?;
    Ok(ok(case))
}

#[utoipa::path(
    put,
    path = "/{id}/cases/{case_id}",
    tag = "Problem Cases",
    operation_id = "updateProblemCase",
    summary = "Update a case",
    description = "Absent fields keep their value.",
    params(
        ("id" = i32, Path, description = "Problem ID"),
        ("case_id" = i32, Path, description = "Case ID"),
    ),
    request_body = ProblemCaseRequest,
    responses(
        (status = 200, description = "Updated case", body = ApiResponse<ProblemCaseResponse>),
        (status = 401, description = "Missing or invalid token", body = ErrorBody),
        (status = 403, description = "Requires `problem:manage`", body = ErrorBody),
        (status = 404, description = "Case does not exist in this problem (11515)", body = ErrorBody),
        (status = 422, description = "Name already used in this problem (11512)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload))]
pub async fn update_case(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path((problem_id, case_id)): Path<(i32, i32)>,
    AppJson(payload): AppJson<ProblemCaseRequest>,
) -> Result<Json<ApiResponse<ProblemCaseResponse>>, AppError> {
    auth_user.require_permission(MANAGE)?;
    let service = ProblemCaseService::new(&state.db);
    owned_case(&service, problem_id, case_id).await?;
    let case = service.update_problem_case(case_id, payload).await?;
    Ok(ok(case))
}

#[utoipa::path(
    delete,
    path = "/{id}/cases/{case_id}",
    tag = "Problem Cases",
    operation_id = "deleteProblemCase",
    summary = "Delete a case",
    params(
        ("id" = i32, Path, description = "Problem ID"),
        ("case_id" = i32, Path, description = "Case ID"),
    ),
    responses(
        (status = 200, description = "Case deleted", body = ApiResponse<Empty>),
        (status = 401, description = "Missing or invalid token", body = ErrorBody),
        (status = 403, description = "Requires `problem:manage`", body = ErrorBody),
        (status = 404, description = "Case does not exist in this problem (11515)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user))]
pub async fn delete_case(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path((problem_id, case_id)): Path<(i32, i32)>,
) -> Result<Json<ApiResponse<Empty>>, AppError> {
    auth_user.require_permission(MANAGE)?;
    let service = ProblemCaseService::new(&state.db);
    owned_case(&service, problem_id, case_id).await?;
    service.delete_problem_case_by_id(case_id).await?;
    Ok(ok_message("case deleted"))
}
