use axum::Json;
use axum::extract::State;
use tracing::instrument;

use crate::entity::submission;
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::{AppJson, AppQuery};
use crate::models::shared::{ApiResponse, PageInfo, PageQuery, ok};
use crate::models::submission::{
    ActivityItem, ActivityQuery, RecordSubmissionRequest, SubmissionListItem,
};
use crate::services::submission::SubmissionService;
use crate::state::AppState;

const SORT_COLUMNS: &[(&str, submission::Column)] = &[
    ("id", submission::Column::Id),
    ("status", submission::Column::Status),
    ("timeUsed", submission::Column::TimeUsed),
    ("memoryUsed", submission::Column::MemoryUsed),
    ("createdAt", submission::Column::CreatedAt),
];

#[utoipa::path(
    get,
    path = "/",
    tag = "Submissions",
    operation_id = "listOwnSubmissions",
    summary = "List the caller's submissions",
    description = "Newest first unless sorted by `id`, `status`, `timeUsed`, `memoryUsed` or `createdAt`.",
    params(PageQuery),
    responses(
        (status = 200, description = "One page of submissions", body = ApiResponse<PageInfo<SubmissionListItem>>),
        (status = 400, description = "Invalid paging or sort parameters", body = ErrorBody),
        (status = 401, description = "Missing or invalid token", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, page), fields(user_id = auth_user.user_id))]
pub async fn list_submissions(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppQuery(page): AppQuery<PageQuery>,
) -> Result<Json<ApiResponse<PageInfo<SubmissionListItem>>>, AppError> {
    let page = page.resolve(SORT_COLUMNS)?;
    let list = SubmissionService::new(&state.db)
        .get_user_submission_list(auth_user.user_id, &page)
        .await?;
    Ok(ok(list))
}

#[utoipa::path(
    get,
    path = "/activity",
    tag = "Submissions",
    operation_id = "getActivityMap",
    summary = "Daily submission counts",
    description = "Counts per UTC day, sorted by date. Days without submissions are omitted.",
    params(ActivityQuery),
    responses(
        (status = 200, description = "Activity", body = ApiResponse<Vec<ActivityItem>>),
        (status = 400, description = "Year out of range", body = ErrorBody),
        (status = 401, description = "Missing or invalid token", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, query), fields(user_id = auth_user.user_id, year = query.year))]
pub async fn get_activity(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppQuery(query): AppQuery<ActivityQuery>,
) -> Result<Json<ApiResponse<Vec<ActivityItem>>>, AppError> {
    let items = SubmissionService::new(&state.db)
        .get_activity_map(auth_user.user_id, query.year)
        .await?;
    Ok(ok(items))
}

#[utoipa::path(
    get,
    path = "/activity/years",
    tag = "Submissions",
    operation_id = "getActivityYears",
    summary = "Years with submissions",
    responses(
        (status = 200, description = "Years, oldest first", body = ApiResponse<Vec<String>>),
        (status = 401, description = "Missing or invalid token", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn get_activity_years(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<String>>>, AppError> {
    let years = SubmissionService::new(&state.db)
        .get_activity_year(auth_user.user_id)
        .await?;
    Ok(ok(years))
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Submissions",
    operation_id = "recordSubmission",
    summary = "Record a judge result",
    description = "Called by the judge. Stores the submission and updates the user's attempt record in one transaction. Returns the submission id.",
    request_body = RecordSubmissionRequest,
    responses(
        (status = 200, description = "Id of the stored submission", body = ApiResponse<i32>),
        (status = 400, description = "Unknown status code", body = ErrorBody),
        (status = 401, description = "Missing or invalid token", body = ErrorBody),
        (status = 403, description = "Requires `submission:record`", body = ErrorBody),
        (status = 404, description = "Problem does not exist (11507)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload))]
pub async fn record_submission(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<RecordSubmissionRequest>,
) -> Result<Json<ApiResponse<i32>>, AppError> {
    auth_user.require_permission("submission:record")?;
    let id = SubmissionService::new(&state.db)
        .record_submission(payload)
        .await?;
    Ok(ok(id))
}
