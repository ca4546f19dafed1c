use std::collections::HashMap;
use std::io::ErrorKind;

use chrono::Utc;
use sea_orm::{ConnectionTrait, DatabaseConnection, DbErr, Set, SqlErr, TransactionTrait};
use tracing::{info, instrument};

use crate::config::ProblemConfig;
use crate::dao::problem::ProblemDao;
use crate::dao::problem_attempt::ProblemAttemptDao;
use crate::dao::problem_case::ProblemCaseDao;
use crate::dao::problem_menu::ProblemMenuDao;
use crate::entity::problem;
use crate::error::{AppError, BusError};
use crate::models::problem::{
    ProblemFilter, ProblemListItem, ProblemRequest, ProblemResponse, clamp_difficulty,
    supports_language,
};
use crate::models::shared::{PageInfo, PageRequest, dedup_ids};
use crate::models::submission::AttemptStatus;
use crate::utils::filename;

const DEFAULT_NAME: &str = "未命名题目";
const DEFAULT_TITLE: &str = "标题信息";
const GENERATED_NUMBER_PREFIX: &str = "未命名编号";

pub struct ProblemService<'a> {
    db: &'a DatabaseConnection,
    config: &'a ProblemConfig,
}

impl<'a> ProblemService<'a> {
    pub fn new(db: &'a DatabaseConnection, config: &'a ProblemConfig) -> Self {
        Self { db, config }
    }

    /// Whether `number` is still free. Numbers of deleted problems stay taken.
    pub async fn check_problem_number(&self, number: &str) -> Result<bool, AppError> {
        Ok(!ProblemDao::new(self.db)
            .number_taken(number.trim(), None)
            .await?)
    }

    /// Create a disabled problem, filling in defaults for absent fields.
    #[instrument(skip(self, req))]
    pub async fn insert_problem(
        &self,
        creator_id: i32,
        req: ProblemRequest,
    ) -> Result<ProblemResponse, AppError> {
        let description = match req.description.filter(|d| !d.trim().is_empty()) {
            Some(description) => description,
            None => self.description_template().await?,
        };
        let number = req
            .number
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .unwrap_or_else(generate_number);
        let menu_ids = dedup_ids(req.menu_ids.as_deref().unwrap_or_default());

        let txn = self.db.begin().await?;
        let dao = ProblemDao::new(&txn);
        if dao.number_taken(&number, None).await? {
            return Err(BusError::ProblemCodeIsExist.into());
        }
        ensure_menus_exist(&txn, &menu_ids).await?;

        let now = Utc::now();
        let model = dao
            .insert(problem::ActiveModel {
                creator_id: Set(creator_id),
                number: Set(number),
                name: Set(super::or_default(req.name, DEFAULT_NAME)),
                title: Set(super::or_default(req.title, DEFAULT_TITLE)),
                description: Set(description),
                difficulty: Set(clamp_difficulty(req.difficulty)),
                enable: Set(problem::DISABLED),
                languages: Set(req.languages.unwrap_or_default()),
                created_at: Set(now),
                updated_at: Set(now),
                deleted_at: Set(None),
                ..Default::default()
            })
            .await
            .map_err(number_conflict)?;
        dao.add_to_menus(model.id, &menu_ids).await?;
        txn.commit().await?;

        info!(problem_id = model.id, number = %model.number, "Created problem");
        Ok(ProblemResponse::new(model, menu_ids))
    }

    /// Replace the present fields and, when `menuIds` is given, the menu
    /// links.
    #[instrument(skip(self, req))]
    pub async fn update_problem(
        &self,
        id: i32,
        req: ProblemRequest,
    ) -> Result<ProblemResponse, AppError> {
        let txn = self.db.begin().await?;
        let dao = ProblemDao::new(&txn);
        let existing = dao.find_by_id(id).await?.ok_or(BusError::ProblemNotExist)?;

        let mut active: problem::ActiveModel = existing.clone().into();
        if let Some(number) = req.number.map(|n| n.trim().to_string()) {
            if number.is_empty() {
                return Err(AppError::Validation("Problem number must not be empty".into()));
            }
            if number != existing.number {
                if dao.number_taken(&number, Some(id)).await? {
                    return Err(BusError::ProblemCodeIsExist.into());
                }
                active.number = Set(number);
            }
        }
        if let Some(name) = req.name {
            active.name = Set(super::or_default(Some(name), DEFAULT_NAME));
        }
        if let Some(title) = req.title {
            active.title = Set(super::or_default(Some(title), DEFAULT_TITLE));
        }
        if let Some(description) = req.description {
            active.description = Set(description);
        }
        if req.difficulty.is_some() {
            active.difficulty = Set(clamp_difficulty(req.difficulty));
        }
        if let Some(languages) = req.languages {
            active.languages = Set(languages);
        }
        active.updated_at = Set(Utc::now());
        let model = dao.update(active).await.map_err(number_conflict)?;

        let menu_ids = match req.menu_ids {
            Some(ids) => {
                let ids = dedup_ids(&ids);
                ensure_menus_exist(&txn, &ids).await?;
                dao.clear_menus(id).await?;
                dao.add_to_menus(id, &ids).await?;
                ids
            }
            None => dao.menu_ids(id).await?,
        };
        txn.commit().await?;

        Ok(ProblemResponse::new(model, menu_ids))
    }

    /// Soft-delete the problem with its cases and drop its menu links, all
    /// in one transaction.
    #[instrument(skip(self))]
    pub async fn delete_problem(&self, id: i32) -> Result<(), AppError> {
        let txn = self.db.begin().await?;
        let dao = ProblemDao::new(&txn);
        dao.find_by_id(id).await?.ok_or(BusError::ProblemNotExist)?;

        let cases = ProblemCaseDao::new(&txn).soft_delete_by_problem(id).await?;
        dao.clear_menus(id).await?;
        dao.soft_delete(id).await?;
        txn.commit().await?;

        info!(problem_id = id, cases, "Deleted problem");
        Ok(())
    }

    pub async fn get_problem_by_id(&self, id: i32) -> Result<ProblemResponse, AppError> {
        let dao = ProblemDao::new(self.db);
        let model = dao.find_by_id(id).await?.ok_or(BusError::ProblemNotExist)?;
        let menu_ids = dao.menu_ids(model.id).await?;
        Ok(ProblemResponse::new(model, menu_ids))
    }

    pub async fn get_problem_by_number(&self, number: &str) -> Result<ProblemResponse, AppError> {
        let dao = ProblemDao::new(self.db);
        let model = dao
            .find_by_number(number.trim())
            .await?
            .ok_or(BusError::ProblemNotExist)?;
        let menu_ids = dao.menu_ids(model.id).await?;
        Ok(ProblemResponse::new(model, menu_ids))
    }

    pub async fn get_problem_list(
        &self,
        filter: &ProblemFilter,
        page: &PageRequest<problem::Column>,
    ) -> Result<PageInfo<ProblemListItem>, AppError> {
        let (rows, total) = ProblemDao::new(self.db).find_page(filter, page).await?;
        Ok(PageInfo::new(rows, total).map(ProblemListItem::from))
    }

    /// Enabled problems only, each with the caller's attempt status.
    pub async fn get_user_problem_list(
        &self,
        user_id: i32,
        filter: &ProblemFilter,
        page: &PageRequest<problem::Column>,
    ) -> Result<PageInfo<ProblemListItem>, AppError> {
        let filter = ProblemFilter {
            enable: Some(problem::ENABLED),
            ..filter.clone()
        };
        let (rows, total) = ProblemDao::new(self.db).find_page(&filter, page).await?;

        let ids: Vec<i32> = rows.iter().map(|p| p.id).collect();
        let statuses: HashMap<i32, i32> = ProblemAttemptDao::new(self.db)
            .statuses(user_id, &ids)
            .await?
            .into_iter()
            .collect();

        Ok(PageInfo::new(rows, total).map(|p| {
            let status = statuses
                .get(&p.id)
                .copied()
                .unwrap_or(AttemptStatus::NotStarted.code());
            ProblemListItem {
                status: Some(status),
                ..ProblemListItem::from(p)
            }
        }))
    }

    pub async fn update_problem_enable(&self, id: i32, enable: i32) -> Result<(), AppError> {
        if enable != problem::ENABLED && enable != problem::DISABLED {
            return Err(AppError::Validation("enable must be -1 or 1".into()));
        }
        if !ProblemDao::new(self.db).update_enable(id, enable).await? {
            return Err(BusError::ProblemNotExist.into());
        }
        Ok(())
    }

    /// Starter code for `language`, read from the template directory.
    pub async fn get_problem_template_code(
        &self,
        id: i32,
        language: &str,
    ) -> Result<String, AppError> {
        let problem = ProblemDao::new(self.db)
            .find_by_id(id)
            .await?
            .ok_or(BusError::ProblemNotExist)?;
        if !supports_language(&problem.languages, language) {
            return Err(BusError::LanguageNotSupported.into());
        }
        let language = filename::validate_flat_filename(language)
            .map_err(|e| AppError::Validation(e.message().into()))?;

        let path = self.config.code_template_dir.join(language);
        match tokio::fs::read_to_string(&path).await {
            Ok(code) => Ok(code),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(BusError::ProblemFileNotExist.into()),
            Err(e) => Err(AppError::Internal(format!(
                "failed to read {}: {e}",
                path.display()
            ))),
        }
    }

    async fn description_template(&self) -> Result<String, AppError> {
        let path = &self.config.description_template;
        tokio::fs::read_to_string(path).await.map_err(|e| {
            tracing::error!(path = %path.display(), "Cannot read description template: {e}");
            AppError::Bus(BusError::ProblemFileNotExist)
        })
    }
}

async fn ensure_menus_exist<C: ConnectionTrait>(conn: &C, menu_ids: &[i32]) -> Result<(), AppError> {
    let found = ProblemMenuDao::new(conn).count_by_ids(menu_ids).await?;
    if found != menu_ids.len() as u64 {
        return Err(BusError::ProblemMenuNotExist.into());
    }
    Ok(())
}

fn number_conflict(err: DbErr) -> AppError {
    if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
        BusError::ProblemCodeIsExist.into()
    } else {
        err.into()
    }
}

/// Placeholder number: prefix, millisecond timestamp, 3 random digits.
fn generate_number() -> String {
    format!(
        "{GENERATED_NUMBER_PREFIX}{}{:03}",
        Utc::now().timestamp_millis(),
        rand::random_range(0..1000)
    )
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::path::PathBuf;

    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult, Value};

    use super::*;

    fn config(dir: &std::path::Path) -> ProblemConfig {
        ProblemConfig {
            description_template: dir.join("problem_description.md"),
            code_template_dir: dir.join("code_templates"),
        }
    }

    #[test]
    fn generated_numbers_carry_the_prefix() {
        let a = generate_number();
        assert!(a.starts_with(GENERATED_NUMBER_PREFIX));
        let digits = &a[GENERATED_NUMBER_PREFIX.len()..];
        assert!(digits.len() >= 16);
        assert!(digits.chars().all(|c| c.is_ascii_digit()));
    }

    #[tokio::test]
    async fn insert_without_number_generates_one_and_disables() {
        let dir = tempfile::tempdir().unwrap();
        tokio::fs::write(dir.path().join("problem_description.md"), "# 题目描述")
            .await
            .unwrap();
        let cfg = config(dir.path());
        let now = Utc::now();

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            // number_taken -> count 0
            .append_query_results([[count_row(0)]])
            // insert ... RETURNING
            .append_query_results([[problem_row(11, now)]])
            .into_connection();

        let created = ProblemService::new(&db, &cfg)
            .insert_problem(
                1,
                ProblemRequest {
                    difficulty: Some(9),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(created.enable, problem::DISABLED);
        assert!(created.menu_ids.is_empty());

        let log = format!("{:?}", db.into_transaction_log());
        assert!(log.contains("未命名编号"));
        assert!(log.contains("未命名题目"));
    }

    #[tokio::test]
    async fn delete_of_missing_problem_fails() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<problem::Model>::new()])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            }])
            .into_connection();
        let cfg = config(&PathBuf::from("."));

        let err = ProblemService::new(&db, &cfg)
            .delete_problem(3)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Bus(BusError::ProblemNotExist)));
    }

    #[tokio::test]
    async fn enable_accepts_only_two_values() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let cfg = config(&PathBuf::from("."));
        let err = ProblemService::new(&db, &cfg)
            .update_problem_enable(1, 0)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    fn count_row(n: i64) -> BTreeMap<&'static str, Value> {
        BTreeMap::from([("num_items", Value::from(n))])
    }

    fn problem_row(id: i32, now: chrono::DateTime<Utc>) -> BTreeMap<&'static str, Value> {
        BTreeMap::from([
            ("id", Value::from(id)),
            ("creator_id", Value::from(1)),
            ("number", Value::from("未命名编号1700000000000042")),
            ("name", Value::from(DEFAULT_NAME)),
            ("title", Value::from(DEFAULT_TITLE)),
            ("description", Value::from("# 题目描述")),
            ("difficulty", Value::from(1)),
            ("enable", Value::from(problem::DISABLED)),
            ("languages", Value::from("")),
            ("created_at", Value::from(now)),
            ("updated_at", Value::from(now)),
            ("deleted_at", Value::from(None::<chrono::DateTime<Utc>>)),
        ])
    }
}
