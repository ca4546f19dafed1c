use std::collections::HashMap;

use chrono::Utc;
use common::storage::{ObjectStore, StoredObject};
use sea_orm::{DatabaseConnection, Set, TransactionTrait};
use tracing::{info, instrument};

use crate::config::AppConfig;
use crate::dao::problem_menu::ProblemMenuDao;
use crate::dao::user::UserDao;
use crate::entity::problem_menu;
use crate::error::{AppError, BusError};
use crate::models::problem_menu::{
    ProblemMenuFilter, ProblemMenuListItem, ProblemMenuRequest, ProblemMenuResponse,
};
use crate::models::shared::{PageInfo, PageRequest, SimpleItem, dedup_ids};

/// Object key prefix of menu icons.
pub const ICON_PREFIX: &str = "icon/problemMenu";

const DEFAULT_NAME: &str = "未命名题单";
const DEFAULT_DESCRIPTION: &str = "无描述信息";

pub struct ProblemMenuService<'a> {
    db: &'a DatabaseConnection,
    storage: &'a dyn ObjectStore,
    config: &'a AppConfig,
}

impl<'a> ProblemMenuService<'a> {
    pub fn new(
        db: &'a DatabaseConnection,
        storage: &'a dyn ObjectStore,
        config: &'a AppConfig,
    ) -> Self {
        Self {
            db,
            storage,
            config,
        }
    }

    /// Store an icon image and return its public URL.
    pub async fn upload_problem_menu_icon(
        &self,
        file_name: &str,
        bytes: &[u8],
    ) -> Result<String, AppError> {
        let name = super::store_asset(self.storage, ICON_PREFIX, file_name, bytes).await?;
        Ok(self.config.api_url(&format!("problem-menus/icon/{name}")))
    }

    pub async fn read_problem_menu_icon(&self, name: &str) -> Result<StoredObject, AppError> {
        super::read_asset(self.storage, ICON_PREFIX, name).await
    }

    pub async fn insert_problem_menu(
        &self,
        creator_id: i32,
        req: ProblemMenuRequest,
    ) -> Result<ProblemMenuResponse, AppError> {
        let now = Utc::now();
        let model = ProblemMenuDao::new(self.db)
            .insert(problem_menu::ActiveModel {
                name: Set(super::or_default(req.name, DEFAULT_NAME)),
                icon: Set(req.icon.unwrap_or_default()),
                description: Set(super::or_default(req.description, DEFAULT_DESCRIPTION)),
                creator_id: Set(creator_id),
                created_at: Set(now),
                updated_at: Set(now),
                deleted_at: Set(None),
                ..Default::default()
            })
            .await?;
        Ok(model.into())
    }

    /// Update the present fields. The creator never changes.
    pub async fn update_problem_menu(
        &self,
        id: i32,
        req: ProblemMenuRequest,
    ) -> Result<ProblemMenuResponse, AppError> {
        let dao = ProblemMenuDao::new(self.db);
        let existing = dao.find_by_id(id).await?.ok_or(BusError::ProblemMenuNotExist)?;

        let mut active: problem_menu::ActiveModel = existing.into();
        if let Some(name) = req.name {
            active.name = Set(super::or_default(Some(name), DEFAULT_NAME));
        }
        if let Some(icon) = req.icon {
            active.icon = Set(icon);
        }
        if let Some(description) = req.description {
            active.description = Set(super::or_default(Some(description), DEFAULT_DESCRIPTION));
        }
        active.updated_at = Set(Utc::now());
        Ok(dao.update(active).await?.into())
    }

    /// Delete a menu. Without `force`, a menu that still holds problems is
    /// refused; with it, the links go too.
    #[instrument(skip(self))]
    pub async fn delete_problem_menu(&self, id: i32, force: bool) -> Result<(), AppError> {
        let txn = self.db.begin().await?;
        let dao = ProblemMenuDao::new(&txn);
        dao.find_by_id(id).await?.ok_or(BusError::ProblemMenuNotExist)?;

        let members = dao.problem_count(id).await?;
        if members > 0 && !force {
            return Err(BusError::ProblemMenuNotEmpty.into());
        }
        dao.clear_problems(id).await?;
        dao.soft_delete(id).await?;
        txn.commit().await?;

        info!(menu_id = id, members, "Deleted problem menu");
        Ok(())
    }

    /// Menus with their problem counts and creator names.
    pub async fn get_problem_menu_list(
        &self,
        filter: &ProblemMenuFilter,
        page: &PageRequest<problem_menu::Column>,
    ) -> Result<PageInfo<ProblemMenuListItem>, AppError> {
        let dao = ProblemMenuDao::new(self.db);
        let (rows, total) = dao.find_page(filter, page).await?;

        let menu_ids: Vec<i32> = rows.iter().map(|m| m.id).collect();
        let counts: HashMap<i32, i64> = dao.problem_counts(&menu_ids).await?.into_iter().collect();
        let creator_ids = dedup_ids(&rows.iter().map(|m| m.creator_id).collect::<Vec<_>>());
        let creators: HashMap<i32, String> = UserDao::new(self.db)
            .find_by_ids(&creator_ids)
            .await?
            .into_iter()
            .map(|u| (u.id, u.user_name))
            .collect();

        Ok(PageInfo::new(rows, total).map(|m| ProblemMenuListItem {
            problem_count: counts.get(&m.id).copied().unwrap_or(0),
            creator_name: creators.get(&m.creator_id).cloned().unwrap_or_default(),
            id: m.id,
            name: m.name,
            icon: m.icon,
            description: m.description,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }))
    }

    pub async fn get_all_problem_menu(&self) -> Result<Vec<ProblemMenuResponse>, AppError> {
        let rows = ProblemMenuDao::new(self.db).find_all().await?;
        Ok(rows.into_iter().map(ProblemMenuResponse::from).collect())
    }

    pub async fn get_simple_problem_menu_list(&self) -> Result<Vec<SimpleItem>, AppError> {
        let rows = ProblemMenuDao::new(self.db).find_simple().await?;
        Ok(rows.into_iter().map(SimpleItem::from).collect())
    }

    pub async fn get_problem_menu_by_id(&self, id: i32) -> Result<ProblemMenuResponse, AppError> {
        let model = ProblemMenuDao::new(self.db)
            .find_by_id(id)
            .await?
            .ok_or(BusError::ProblemMenuNotExist)?;
        Ok(model.into())
    }
}
