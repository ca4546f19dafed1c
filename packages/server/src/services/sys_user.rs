use std::collections::HashMap;

use chrono::Utc;
use sea_orm::{DatabaseConnection, Set, TransactionTrait};
use tracing::instrument;

use crate::config::AuthConfig;
use crate::dao::role::RoleDao;
use crate::dao::user::UserDao;
use crate::entity::user;
use crate::error::{AppError, BusError};
use crate::models::shared::{PageInfo, PageRequest, dedup_ids};
use crate::models::user::{SysUserFilter, SysUserRequest, SysUserResponse, normalize_gender};
use crate::utils::{hash, username};

const DEFAULT_USER_NAME: &str = "funcoder";

/// Administrator-side account management.
pub struct SysUserService<'a> {
    db: &'a DatabaseConnection,
    auth: &'a AuthConfig,
}

impl<'a> SysUserService<'a> {
    pub fn new(db: &'a DatabaseConnection, auth: &'a AuthConfig) -> Self {
        Self { db, auth }
    }

    pub async fn get_user_by_id(&self, id: i32) -> Result<SysUserResponse, AppError> {
        let model = UserDao::new(self.db)
            .find_by_id(id)
            .await?
            .ok_or(BusError::UserNotExist)?;
        Ok(model.into())
    }

    /// Create an account with a random login name and the configured
    /// default password.
    #[instrument(skip(self, req))]
    pub async fn insert_sys_user(&self, req: SysUserRequest) -> Result<SysUserResponse, AppError> {
        let dao = UserDao::new(self.db);
        let email = req.email.unwrap_or_default().trim().to_string();
        if !email.is_empty() {
            if !username::is_email(&email) {
                return Err(BusError::UserEmailIsNotValid.into());
            }
            if dao.email_exists(&email).await? {
                return Err(BusError::UserEmailIsExist.into());
            }
        }

        let password = hash::hash_password(&self.auth.default_password)
            .map_err(|_| BusError::PasswordEncodeFailed)?;
        let now = Utc::now();
        let model = dao
            .insert(user::ActiveModel {
                avatar: Set(req.avatar.unwrap_or_default()),
                user_name: Set(super::or_default(req.user_name, DEFAULT_USER_NAME)),
                login_name: Set(uuid::Uuid::new_v4().simple().to_string()),
                password: Set(password),
                email: Set(email),
                phone: Set(req.phone.unwrap_or_default()),
                introduction: Set(req.introduction.unwrap_or_default()),
                gender: Set(normalize_gender(req.gender)),
                birthday: Set(req.birthday.unwrap_or_else(|| now.date_naive())),
                created_at: Set(now),
                updated_at: Set(now),
                deleted_at: Set(None),
                ..Default::default()
            })
            .await?;
        Ok(model.into())
    }

    /// Update profile fields. Login name and password are not touched.
    pub async fn update_sys_user(
        &self,
        id: i32,
        req: SysUserRequest,
    ) -> Result<SysUserResponse, AppError> {
        let dao = UserDao::new(self.db);
        let existing = dao.find_by_id(id).await?.ok_or(BusError::UserNotExist)?;
        let model = dao.update(apply_profile(existing, req, self.db).await?).await?;
        Ok(model.into())
    }

    #[instrument(skip(self))]
    pub async fn delete_sys_user(&self, id: i32) -> Result<(), AppError> {
        let txn = self.db.begin().await?;
        let dao = UserDao::new(&txn);
        if !dao.soft_delete(id).await? {
            return Err(BusError::UserNotExist.into());
        }
        dao.clear_roles(id).await?;
        txn.commit().await?;
        Ok(())
    }

    pub async fn get_sys_user_list(
        &self,
        filter: &SysUserFilter,
        page: &PageRequest<user::Column>,
    ) -> Result<PageInfo<SysUserResponse>, AppError> {
        let dao = UserDao::new(self.db);
        let (rows, total) = dao.find_page(filter, page).await?;

        let user_ids: Vec<i32> = rows.iter().map(|u| u.id).collect();
        let links = dao.role_links(&user_ids).await?;
        let role_ids = dedup_ids(&links.iter().map(|(_, r)| *r).collect::<Vec<_>>());
        let role_names: HashMap<i32, String> = RoleDao::new(self.db)
            .find_by_ids(&role_ids)
            .await?
            .into_iter()
            .map(|r| (r.id, r.name))
            .collect();

        let mut names_by_user: HashMap<i32, Vec<String>> = HashMap::new();
        for (user_id, role_id) in links {
            if let Some(name) = role_names.get(&role_id) {
                names_by_user.entry(user_id).or_default().push(name.clone());
            }
        }

        Ok(PageInfo::new(rows, total).map(|u| {
            let role_names = names_by_user.remove(&u.id).unwrap_or_default();
            SysUserResponse {
                role_names,
                ..SysUserResponse::from(u)
            }
        }))
    }

    pub async fn get_role_ids_by_user_id(&self, user_id: i32) -> Result<Vec<i32>, AppError> {
        let dao = UserDao::new(self.db);
        dao.find_by_id(user_id).await?.ok_or(BusError::UserNotExist)?;
        Ok(dao.role_ids(user_id).await?)
    }

    /// Replace the user's roles with `role_ids`.
    #[instrument(skip(self, role_ids), fields(count = role_ids.len()))]
    pub async fn update_user_roles(&self, user_id: i32, role_ids: &[i32]) -> Result<(), AppError> {
        let ids = dedup_ids(role_ids);

        let txn = self.db.begin().await?;
        let dao = UserDao::new(&txn);
        dao.find_by_id(user_id).await?.ok_or(BusError::UserNotExist)?;
        if RoleDao::new(&txn).find_by_ids(&ids).await?.len() != ids.len() {
            return Err(BusError::RoleNotExist.into());
        }

        dao.clear_roles(user_id).await?;
        dao.grant_roles(user_id, &ids).await?;
        txn.commit().await?;
        Ok(())
    }
}

/// Copy the present profile fields of `req` onto `existing`.
///
/// A changed email must be well-formed and not used by another account.
pub(crate) async fn apply_profile<C: sea_orm::ConnectionTrait>(
    existing: user::Model,
    req: SysUserRequest,
    conn: &C,
) -> Result<user::ActiveModel, AppError> {
    let new_email = req.email.as_deref().map(str::trim).unwrap_or_default();
    if !new_email.is_empty() && new_email != existing.email {
        if !username::is_email(new_email) {
            return Err(BusError::UserEmailIsNotValid.into());
        }
        if UserDao::new(conn).email_exists(new_email).await? {
            return Err(BusError::UserEmailIsExist.into());
        }
    }

    let mut active: user::ActiveModel = existing.into();
    if let Some(avatar) = req.avatar {
        active.avatar = Set(avatar);
    }
    if let Some(user_name) = req.user_name {
        active.user_name = Set(super::or_default(Some(user_name), DEFAULT_USER_NAME));
    }
    if let Some(email) = req.email {
        active.email = Set(email.trim().to_string());
    }
    if let Some(phone) = req.phone {
        active.phone = Set(phone);
    }
    if let Some(introduction) = req.introduction {
        active.introduction = Set(introduction);
    }
    if req.gender.is_some() {
        active.gender = Set(normalize_gender(req.gender));
    }
    if let Some(birthday) = req.birthday {
        active.birthday = Set(birthday);
    }
    active.updated_at = Set(Utc::now());
    Ok(active)
}
