use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Datelike, Days, NaiveDate, Utc};
use sea_orm::{DatabaseConnection, Set, TransactionTrait};
use tracing::{debug, instrument};

use crate::dao::problem::ProblemDao;
use crate::dao::problem_attempt::ProblemAttemptDao;
use crate::dao::submission::SubmissionDao;
use crate::entity::{problem_attempt, submission};
use crate::error::{AppError, BusError};
use crate::models::shared::{PageInfo, PageRequest, dedup_ids};
use crate::models::submission::{
    ActivityItem, AttemptStatus, RecordSubmissionRequest, SubmissionListItem, SubmissionStatus,
};

/// First year the activity calendar offers.
pub const FIRST_ACTIVITY_YEAR: i32 = 2022;

pub struct SubmissionService<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> SubmissionService<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Daily submission counts of `user_id` in `year`, or in the last year
    /// ending today when `year` is 0.
    pub async fn get_activity_map(
        &self,
        user_id: i32,
        year: i32,
    ) -> Result<Vec<ActivityItem>, AppError> {
        let (start, end) = activity_range(year, Utc::now().date_naive())?;
        let times = SubmissionDao::new(self.db)
            .created_times(user_id, start, end)
            .await?;
        Ok(group_by_day(&times))
    }

    /// Years with at least one submission, oldest first.
    pub async fn get_activity_year(&self, user_id: i32) -> Result<Vec<String>, AppError> {
        let dao = SubmissionDao::new(self.db);
        let mut years = Vec::new();
        for year in FIRST_ACTIVITY_YEAR..=Utc::now().year() {
            let (start, end) = year_bounds(year)?;
            if dao.exists_between(user_id, start, end).await? {
                years.push(year.to_string());
            }
        }
        Ok(years)
    }

    pub async fn get_user_submission_list(
        &self,
        user_id: i32,
        page: &PageRequest<submission::Column>,
    ) -> Result<PageInfo<SubmissionListItem>, AppError> {
        let (rows, total) = SubmissionDao::new(self.db)
            .find_page_by_user(user_id, page)
            .await?;

        let problem_ids = dedup_ids(&rows.iter().map(|s| s.problem_id).collect::<Vec<_>>());
        let names: HashMap<i32, String> = ProblemDao::new(self.db)
            .names(&problem_ids)
            .await?
            .into_iter()
            .collect();

        Ok(PageInfo::new(rows, total).map(|s| {
            let name = names.get(&s.problem_id).cloned().unwrap_or_default();
            SubmissionListItem::new(s, name)
        }))
    }

    /// Store one judge result and fold it into the user's attempt record.
    #[instrument(skip(self, req), fields(user_id = req.user_id, problem_id = req.problem_id))]
    pub async fn record_submission(&self, req: RecordSubmissionRequest) -> Result<i32, AppError> {
        let outcome = SubmissionStatus::try_from(req.status)
            .map_err(|code| AppError::Validation(format!("Unknown submission status: {code}")))?;

        let txn = self.db.begin().await?;
        ProblemDao::new(&txn)
            .find_by_id(req.problem_id)
            .await?
            .ok_or(BusError::ProblemNotExist)?;

        let now = Utc::now();
        let saved = SubmissionDao::new(&txn)
            .insert(submission::ActiveModel {
                user_id: Set(req.user_id),
                problem_id: Set(req.problem_id),
                language: Set(req.language.clone()),
                code: Set(req.code.clone()),
                status: Set(outcome.code()),
                error_message: Set(req.error_message),
                case_name: Set(req.case_name),
                case_data: Set(req.case_data),
                expected_output: Set(req.expected_output),
                user_output: Set(req.user_output),
                time_used: Set(req.time_used),
                memory_used: Set(req.memory_used),
                created_at: Set(now),
                updated_at: Set(now),
                deleted_at: Set(None),
                ..Default::default()
            })
            .await?;

        let accepted = outcome == SubmissionStatus::Accepted;
        let attempts = ProblemAttemptDao::new(&txn);
        match attempts.find(req.user_id, req.problem_id).await? {
            Some(existing) => {
                let status = AttemptStatus::after(existing.status, outcome);
                let (submissions, successes, errors) = (
                    existing.submission_count + 1,
                    existing.success_count + i32::from(accepted),
                    existing.err_count + i32::from(!accepted),
                );
                let mut active: problem_attempt::ActiveModel = existing.into();
                active.submission_count = Set(submissions);
                active.success_count = Set(successes);
                active.err_count = Set(errors);
                active.code = Set(req.code);
                active.language = Set(req.language);
                active.status = Set(status.code());
                active.updated_at = Set(now);
                attempts.update(active).await?;
            }
            None => {
                attempts
                    .insert(problem_attempt::ActiveModel {
                        user_id: Set(req.user_id),
                        problem_id: Set(req.problem_id),
                        submission_count: Set(1),
                        success_count: Set(i32::from(accepted)),
                        err_count: Set(i32::from(!accepted)),
                        code: Set(req.code),
                        language: Set(req.language),
                        status: Set(AttemptStatus::after(
                            AttemptStatus::NotStarted.code(),
                            outcome,
                        )
                        .code()),
                        created_at: Set(now),
                        updated_at: Set(now),
                        deleted_at: Set(None),
                        ..Default::default()
                    })
                    .await?;
            }
        }
        txn.commit().await?;

        debug!(submission_id = saved.id, status = saved.status, "Recorded submission");
        Ok(saved.id)
    }
}

fn midnight(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(chrono::NaiveTime::MIN).and_utc()
}

fn year_bounds(year: i32) -> Result<(DateTime<Utc>, DateTime<Utc>), AppError> {
    let start = NaiveDate::from_ymd_opt(year, 1, 1);
    let end = year
        .checked_add(1)
        .and_then(|next| NaiveDate::from_ymd_opt(next, 1, 1));
    match (start, end) {
        (Some(start), Some(end)) => Ok((midnight(start), midnight(end))),
        _ => Err(AppError::Validation(format!("Year out of range: {year}"))),
    }
}

/// Half-open `[start, end)` window covered by an activity map request.
pub fn activity_range(
    year: i32,
    today: NaiveDate,
) -> Result<(DateTime<Utc>, DateTime<Utc>), AppError> {
    if year != 0 {
        return year_bounds(year);
    }
    let end = today
        .checked_add_days(Days::new(1))
        .ok_or(BusError::Unknown)?;
    let start = today
        .checked_sub_days(Days::new(365))
        .ok_or(BusError::Unknown)?;
    Ok((midnight(start), midnight(end)))
}

/// Count timestamps per UTC day, sorted by day.
pub fn group_by_day(times: &[DateTime<Utc>]) -> Vec<ActivityItem> {
    let mut days: BTreeMap<NaiveDate, u32> = BTreeMap::new();
    for t in times {
        *days.entry(t.date_naive()).or_default() += 1;
    }
    days.into_iter()
        .map(|(day, count)| ActivityItem {
            date: day.format("%Y-%m-%d").to_string(),
            count,
        })
        .collect()
}
