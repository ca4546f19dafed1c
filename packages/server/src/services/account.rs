use sea_orm::{DatabaseConnection, TransactionTrait};
use tracing::{info, instrument};

use common::storage::{ObjectStore, StoredObject};

use crate::config::AppConfig;
use crate::dao::user::UserDao;
use crate::error::{AppError, BusError};
use crate::mail::{MailMessage, Mailer};
use crate::models::account::{AccountInfoResponse, UpdateAccountRequest};
use crate::models::user::SysUserRequest;
use crate::utils::{hash, random};

/// Object key prefix of user avatars.
pub const AVATAR_PREFIX: &str = "avatar/user";

const RESET_PASSWORD_LEN: usize = 11;

/// Self-service operations of the signed-in user.
pub struct AccountService<'a> {
    db: &'a DatabaseConnection,
    storage: &'a dyn ObjectStore,
    mailer: &'a dyn Mailer,
    config: &'a AppConfig,
}

impl<'a> AccountService<'a> {
    pub fn new(
        db: &'a DatabaseConnection,
        storage: &'a dyn ObjectStore,
        mailer: &'a dyn Mailer,
        config: &'a AppConfig,
    ) -> Self {
        Self {
            db,
            storage,
            mailer,
            config,
        }
    }

    pub async fn get_account_info(&self, user_id: i32) -> Result<AccountInfoResponse, AppError> {
        let user = UserDao::new(self.db)
            .find_by_id(user_id)
            .await?
            .ok_or(BusError::UserNotExist)?;
        Ok(user.into())
    }

    pub async fn update_account_info(
        &self,
        user_id: i32,
        req: UpdateAccountRequest,
    ) -> Result<AccountInfoResponse, AppError> {
        let dao = UserDao::new(self.db);
        let existing = dao.find_by_id(user_id).await?.ok_or(BusError::UserNotExist)?;
        let profile = SysUserRequest {
            avatar: req.avatar,
            user_name: req.user_name,
            email: req.email,
            phone: req.phone,
            introduction: req.introduction,
            gender: req.gender,
            birthday: req.birthday,
        };
        let active = super::sys_user::apply_profile(existing, profile, self.db).await?;
        Ok(dao.update(active).await?.into())
    }

    #[instrument(skip(self, old_password, new_password))]
    pub async fn change_password(
        &self,
        user_id: i32,
        old_password: &str,
        new_password: &str,
    ) -> Result<(), AppError> {
        let dao = UserDao::new(self.db);
        let user = dao.find_by_id(user_id).await?.ok_or(BusError::UserNotExist)?;
        let matches = hash::verify_password(old_password, &user.password)
            .map_err(|_| BusError::PasswordEncodeFailed)?;
        if !matches {
            return Err(BusError::UserNameOrPasswordWrong.into());
        }
        super::check_password_strength(new_password)?;

        let hashed =
            hash::hash_password(new_password).map_err(|_| BusError::PasswordEncodeFailed)?;
        dao.update_password(user_id, &hashed).await?;
        Ok(())
    }

    /// Replace the password with a random one and mail it to the user.
    ///
    /// The new hash is only committed once the mail went out.
    #[instrument(skip(self))]
    pub async fn reset_password(&self, user_id: i32) -> Result<(), AppError> {
        let txn = self.db.begin().await?;
        let dao = UserDao::new(&txn);
        let user = dao.find_by_id(user_id).await?.ok_or(BusError::UserNotExist)?;
        if user.email.is_empty() {
            return Err(BusError::UserEmailIsNotValid.into());
        }

        let password = random::alphanumeric(RESET_PASSWORD_LEN);
        let hashed = hash::hash_password(&password).map_err(|_| BusError::PasswordEncodeFailed)?;
        dao.update_password(user_id, &hashed).await?;

        self.mailer
            .send(MailMessage {
                to: user.email.clone(),
                subject: "funoj-重置密码".into(),
                body: format!("新密码：{password}"),
            })
            .await?;
        txn.commit().await?;

        info!(user_id, "Password reset");
        Ok(())
    }

    /// Store an avatar image and return its public URL.
    pub async fn upload_avatar(&self, file_name: &str, bytes: &[u8]) -> Result<String, AppError> {
        let name = super::store_asset(self.storage, AVATAR_PREFIX, file_name, bytes).await?;
        Ok(self.config.api_url(&format!("account/avatar/{name}")))
    }

    pub async fn read_avatar(&self, name: &str) -> Result<StoredObject, AppError> {
        super::read_asset(self.storage, AVATAR_PREFIX, name).await
    }
}
