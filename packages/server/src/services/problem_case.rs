use chrono::Utc;
use sea_orm::{ConnectionTrait, DatabaseConnection, Set};

use crate::dao::problem::ProblemDao;
use crate::dao::problem_case::ProblemCaseDao;
use crate::entity::problem_case;
use crate::error::{AppError, BusError};
use crate::models::problem_case::{ProblemCaseFilter, ProblemCaseRequest, ProblemCaseResponse};
use crate::models::shared::{PageInfo, PageRequest};

pub struct ProblemCaseService<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> ProblemCaseService<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn get_problem_case_list(
        &self,
        filter: &ProblemCaseFilter,
        page: &PageRequest<problem_case::Column>,
    ) -> Result<PageInfo<ProblemCaseResponse>, AppError> {
        let (rows, total) = ProblemCaseDao::new(self.db).find_page(filter, page).await?;
        Ok(PageInfo::new(rows, total).map(ProblemCaseResponse::from))
    }

    pub async fn get_problem_case_by_id(&self, id: i32) -> Result<ProblemCaseResponse, AppError> {
        Ok(self.find(id).await?.into())
    }

    pub async fn insert_problem_case(
        &self,
        problem_id: i32,
        req: ProblemCaseRequest,
    ) -> Result<ProblemCaseResponse, AppError> {
        ProblemDao::new(self.db)
            .find_by_id(problem_id)
            .await?
            .ok_or(BusError::ProblemNotExist)?;

        let dao = ProblemCaseDao::new(self.db);
        let case_name = match req.case_name.map(|n| n.trim().to_string()) {
            Some(name) if !name.is_empty() => name,
            _ => next_name(&dao, problem_id).await?,
        };
        if !name_available(&dao, problem_id, &case_name, None).await? {
            return Err(BusError::ProblemCaseNameIsExist.into());
        }

        let now = Utc::now();
        let model = dao
            .insert(problem_case::ActiveModel {
                problem_id: Set(problem_id),
                case_name: Set(case_name),
                input: Set(req.input.unwrap_or_default()),
                output: Set(req.output.unwrap_or_default()),
                created_at: Set(now),
                updated_at: Set(now),
                deleted_at: Set(None),
                ..Default::default()
            })
            .await?;
        Ok(model.into())
    }

    pub async fn update_problem_case(
        &self,
        id: i32,
        req: ProblemCaseRequest,
    ) -> Result<ProblemCaseResponse, AppError> {
        let dao = ProblemCaseDao::new(self.db);
        let existing = self.find(id).await?;
        let problem_id = existing.problem_id;

        let mut active: problem_case::ActiveModel = existing.into();
        if let Some(name) = req.case_name.map(|n| n.trim().to_string()) {
            if name.is_empty() {
                return Err(AppError::Validation("Case name must not be empty".into()));
            }
            if !name_available(&dao, problem_id, &name, Some(id)).await? {
                return Err(BusError::ProblemCaseNameIsExist.into());
            }
            active.case_name = Set(name);
        }
        if let Some(input) = req.input {
            active.input = Set(input);
        }
        if let Some(output) = req.output {
            active.output = Set(output);
        }
        active.updated_at = Set(Utc::now());
        Ok(dao.update(active).await?.into())
    }

    pub async fn delete_problem_case_by_id(&self, id: i32) -> Result<(), AppError> {
        if !ProblemCaseDao::new(self.db).soft_delete(id).await? {
            return Err(BusError::ProblemCaseNotExist.into());
        }
        Ok(())
    }

    /// True when no case of `problem_id` is named `name`, or the only one is
    /// case `id` itself.
    pub async fn check_problem_case_name(
        &self,
        id: Option<i32>,
        name: &str,
        problem_id: i32,
    ) -> Result<bool, AppError> {
        Ok(name_available(&ProblemCaseDao::new(self.db), problem_id, name, id).await?)
    }

    pub async fn generate_new_problem_case_name(&self, problem_id: i32) -> Result<String, AppError> {
        next_name(&ProblemCaseDao::new(self.db), problem_id).await
    }

    async fn find(&self, id: i32) -> Result<problem_case::Model, AppError> {
        Ok(ProblemCaseDao::new(self.db)
            .find_by_id(id)
            .await?
            .ok_or(BusError::ProblemCaseNotExist)?)
    }
}

async fn name_available<C: ConnectionTrait>(
    dao: &ProblemCaseDao<'_, C>,
    problem_id: i32,
    name: &str,
    self_id: Option<i32>,
) -> Result<bool, sea_orm::DbErr> {
    let matches = dao.find_by_name(problem_id, name).await?;
    Ok(match matches.as_slice() {
        [] => true,
        [only] => Some(only.id) == self_id,
        _ => false,
    })
}

async fn next_name<C: ConnectionTrait>(
    dao: &ProblemCaseDao<'_, C>,
    problem_id: i32,
) -> Result<String, AppError> {
    let latest = dao.find_last_named(problem_id).await?;
    Ok(next_case_name(latest.as_ref().map(|c| c.case_name.as_str()))?)
}

/// Successor of the latest case name: its trailing number plus one, or
/// `"1"` when there is no case yet.
pub fn next_case_name(latest: Option<&str>) -> Result<String, BusError> {
    let Some(latest) = latest else {
        return Ok("1".to_string());
    };
    let prefix = latest.trim_end_matches(|c: char| c.is_ascii_digit());
    let number: u64 = latest[prefix.len()..].parse().map_err(|_| {
        tracing::error!(latest, "Latest case name has no numeric suffix");
        BusError::Unknown
    })?;
    let next = number.checked_add(1).ok_or(BusError::Unknown)?;
    Ok(format!("{prefix}{next}"))
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use chrono::DateTime;
    use sea_orm::{DatabaseBackend, MockDatabase, Value};

    use super::*;

    fn case(id: i32, name: &str) -> BTreeMap<&'static str, Value> {
        let now = Utc::now();
        BTreeMap::from([
            ("id", Value::from(id)),
            ("problem_id", Value::from(1)),
            ("case_name", Value::from(name)),
            ("input", Value::from("")),
            ("output", Value::from("")),
            ("created_at", Value::from(now)),
            ("updated_at", Value::from(now)),
            ("deleted_at", Value::from(None::<DateTime<Utc>>)),
        ])
    }

    #[test]
    fn next_name_increments_numeric_suffix() {
        assert_eq!(next_case_name(None).unwrap(), "1");
        assert_eq!(next_case_name(Some("1")).unwrap(), "2");
        assert_eq!(next_case_name(Some("case9")).unwrap(), "case10");
        assert_eq!(next_case_name(Some("t-099")).unwrap(), "t-100");
    }

    #[test]
    fn next_name_without_digits_is_unknown_error() {
        assert_eq!(next_case_name(Some("caseA")), Err(BusError::Unknown));
        assert_eq!(
            next_case_name(Some("n18446744073709551615")),
            Err(BusError::Unknown)
        );
    }

    #[tokio::test]
    async fn name_check_excludes_the_case_being_edited() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([
                vec![],
                vec![case(5, "caseA")],
                vec![case(6, "caseA")],
                vec![case(5, "caseA"), case(6, "caseA")],
            ])
            .into_connection();
        let service = ProblemCaseService::new(&db);

        assert!(service.check_problem_case_name(Some(5), "caseA", 1).await.unwrap());
        assert!(service.check_problem_case_name(Some(5), "caseA", 1).await.unwrap());
        assert!(!service.check_problem_case_name(Some(5), "caseA", 1).await.unwrap());
        assert!(!service.check_problem_case_name(Some(5), "caseA", 1).await.unwrap());
    }

    #[tokio::test]
    async fn generated_name_follows_latest_case() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![case(3, "case9")], vec![]])
            .into_connection();
        let service = ProblemCaseService::new(&db);

        assert_eq!(service.generate_new_problem_case_name(1).await.unwrap(), "case10");
        assert_eq!(service.generate_new_problem_case_name(2).await.unwrap(), "1");
    }
}
