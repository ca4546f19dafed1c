use std::time::Duration;

use chrono::Utc;
use sea_orm::{DatabaseConnection, Set, TransactionTrait};
use tracing::{info, instrument};

use crate::cache::CacheStore;
use crate::config::AuthConfig;
use crate::dao::permission::PermissionDao;
use crate::dao::role::RoleDao;
use crate::dao::user::UserDao;
use crate::entity::user;
use crate::error::{AppError, BusError};
use crate::mail::{MailMessage, Mailer};
use crate::models::auth::{CodeKind, RegisterRequest, TokenResponse};
use crate::utils::{hash, jwt, random, username};

/// Lifetime of an emailed verification code.
pub const CODE_TTL: Duration = Duration::from_secs(600);

const DEFAULT_USER_NAME: &str = "fun-coder";
const LOGIN_NAME_RETRIES: usize = 5;

pub struct AuthService<'a> {
    db: &'a DatabaseConnection,
    cache: &'a dyn CacheStore,
    mailer: &'a dyn Mailer,
    auth: &'a AuthConfig,
}

impl<'a> AuthService<'a> {
    pub fn new(
        db: &'a DatabaseConnection,
        cache: &'a dyn CacheStore,
        mailer: &'a dyn Mailer,
        auth: &'a AuthConfig,
    ) -> Self {
        Self {
            db,
            cache,
            mailer,
            auth,
        }
    }

    /// Mail a 6-digit code and remember it for [`CODE_TTL`].
    #[instrument(skip(self))]
    pub async fn send_auth_code(&self, email: &str, kind: &str) -> Result<(), AppError> {
        let kind = CodeKind::parse(kind).ok_or(BusError::UserTypeNotSupport)?;
        let email = email.trim();
        if !username::is_email(email) {
            return Err(BusError::UserEmailIsNotValid.into());
        }
        if kind == CodeKind::Register && UserDao::new(self.db).email_exists(email).await? {
            return Err(BusError::UserEmailIsExist.into());
        }

        let code = random::digits(6);
        self.cache
            .set_ex(&kind.cache_key(email), &code, CODE_TTL)
            .await?;

        let subject = match kind {
            CodeKind::Register => "funoj 注册验证码",
            CodeKind::Login => "funoj 登录验证码",
        };
        self.mailer
            .send(MailMessage {
                to: email.to_string(),
                subject: subject.to_string(),
                body: format!("验证码：{code}"),
            })
            .await?;
        Ok(())
    }

    /// `account` is matched as an email when it looks like one, otherwise
    /// as a login name.
    #[instrument(skip(self, password))]
    pub async fn login_by_password(
        &self,
        account: &str,
        password: &str,
    ) -> Result<TokenResponse, AppError> {
        let account = account.trim();
        let dao = UserDao::new(self.db);
        let found = if username::is_email(account) {
            dao.find_by_email(account).await?
        } else {
            dao.find_by_login_name(account).await?
        };
        let user = found.ok_or(BusError::UserNotExist)?;

        let matches = hash::verify_password(password, &user.password)
            .map_err(|_| BusError::PasswordEncodeFailed)?;
        if !matches {
            return Err(BusError::UserNameOrPasswordWrong.into());
        }
        self.issue_token(&user).await
    }

    #[instrument(skip(self, code))]
    pub async fn login_by_email(&self, email: &str, code: &str) -> Result<TokenResponse, AppError> {
        let email = email.trim();
        let key = CodeKind::Login.cache_key(email);
        if !code_matches(self.cache.get(&key).await?, code) {
            return Err(BusError::LoginCodeWrong.into());
        }

        let user = UserDao::new(self.db)
            .find_by_email(email)
            .await?
            .ok_or(BusError::UserNotExist)?;
        self.cache.delete(&key).await?;
        self.issue_token(&user).await
    }

    /// Create an account from a verified email and grant it the default role.
    #[instrument(skip(self, req), fields(email = %req.email))]
    pub async fn user_register(&self, req: RegisterRequest) -> Result<(), AppError> {
        super::check_password_strength(&req.password)?;

        let email = req.email.trim();
        if !username::is_email(email) {
            return Err(BusError::UserEmailIsNotValid.into());
        }
        if UserDao::new(self.db).email_exists(email).await? {
            return Err(BusError::UserEmailIsExist.into());
        }
        let key = CodeKind::Register.cache_key(email);
        if !code_matches(self.cache.get(&key).await?, &req.code) {
            return Err(BusError::RegisterCodeWrong.into());
        }

        let password =
            hash::hash_password(&req.password).map_err(|_| BusError::PasswordEncodeFailed)?;
        let user_name = super::or_default(Some(req.username), DEFAULT_USER_NAME);

        let txn = self.db.begin().await?;
        let users = UserDao::new(&txn);
        let login_name = self.unique_login_name(&users, &user_name).await?;
        let default_role = RoleDao::new(&txn)
            .find_by_name(&self.auth.default_role)
            .await?
            .ok_or(BusError::RoleNotExist)?;

        let now = Utc::now();
        let created = users
            .insert(user::ActiveModel {
                avatar: Set(String::new()),
                user_name: Set(user_name),
                login_name: Set(login_name),
                password: Set(password),
                email: Set(email.to_string()),
                phone: Set(String::new()),
                introduction: Set(String::new()),
                gender: Set(1),
                birthday: Set(now.date_naive()),
                created_at: Set(now),
                updated_at: Set(now),
                deleted_at: Set(None),
                ..Default::default()
            })
            .await?;
        users.grant_roles(created.id, &[default_role.id]).await?;
        txn.commit().await?;

        self.cache.delete(&key).await?;
        info!(user_id = created.id, login_name = %created.login_name, "Registered user");
        Ok(())
    }

    /// Transliterated stem plus 3 random digits; each collision appends one
    /// more digit.
    async fn unique_login_name<C: sea_orm::ConnectionTrait>(
        &self,
        users: &UserDao<'_, C>,
        user_name: &str,
    ) -> Result<String, AppError> {
        let mut stem = username::login_name_stem(user_name);
        if stem.is_empty() {
            stem = "funcoder".into();
        }
        let mut candidate = format!("{stem}{}", random::digits(3));
        for _ in 0..LOGIN_NAME_RETRIES {
            if !users.login_name_exists(&candidate).await? {
                return Ok(candidate);
            }
            candidate.push_str(&random::digits(1));
        }
        Err(BusError::UserCreationFailed.into())
    }

    /// Sign a session token carrying the user's role ids and the codes of
    /// every permission those roles grant.
    pub async fn issue_token(&self, user: &user::Model) -> Result<TokenResponse, AppError> {
        let roles = UserDao::new(self.db).role_ids(user.id).await?;
        let permission_ids = RoleDao::new(self.db)
            .permission_ids_of_roles(&roles)
            .await?;
        let mut permissions: Vec<String> = PermissionDao::new(self.db)
            .find_by_ids(&permission_ids)
            .await?
            .into_iter()
            .map(|p| p.code)
            .collect();
        permissions.sort();
        permissions.dedup();

        let token = jwt::sign(
            jwt::TokenSubject {
                id: user.id,
                avatar: user.avatar.clone(),
                user_name: user.user_name.clone(),
                login_name: user.login_name.clone(),
                phone: user.phone.clone(),
                email: user.email.clone(),
                roles,
                permissions,
            },
            self.auth,
        )
        .map_err(|e| AppError::Internal(format!("token signing failed: {e}")))?;
        Ok(TokenResponse { token })
    }
}

fn code_matches(stored: Option<String>, supplied: &str) -> bool {
    matches!(stored, Some(code) if !code.is_empty() && code == supplied.trim())
}
