use chrono::Utc;
use sea_orm::sea_query::LikeExpr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, Order, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Select, Set,
};

use crate::entity::{user, user_role};
use crate::models::user::SysUserFilter;
use crate::models::shared::{PageRequest, like_pattern};

pub struct UserDao<'a, C: ConnectionTrait> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> UserDao<'a, C> {
    pub fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    fn live() -> Select<user::Entity> {
        user::Entity::find().filter(user::Column::DeletedAt.is_null())
    }

    pub async fn find_by_id(&self, id: i32) -> Result<Option<user::Model>, DbErr> {
        Self::live()
            .filter(user::Column::Id.eq(id))
            .one(self.conn)
            .await
    }

    pub async fn find_by_ids(&self, ids: &[i32]) -> Result<Vec<user::Model>, DbErr> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        Self::live()
            .filter(user::Column::Id.is_in(ids.iter().copied()))
            .all(self.conn)
            .await
    }

    pub async fn find_by_login_name(&self, login_name: &str) -> Result<Option<user::Model>, DbErr> {
        Self::live()
            .filter(user::Column::LoginName.eq(login_name))
            .one(self.conn)
            .await
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<user::Model>, DbErr> {
        Self::live()
            .filter(user::Column::Email.eq(email))
            .order_by_asc(user::Column::Id)
            .one(self.conn)
            .await
    }

    pub async fn email_exists(&self, email: &str) -> Result<bool, DbErr> {
        Ok(Self::live()
            .filter(user::Column::Email.eq(email))
            .count(self.conn)
            .await?
            > 0)
    }

    /// Login names stay reserved after soft deletion, so deleted rows count.
    pub async fn login_name_exists(&self, login_name: &str) -> Result<bool, DbErr> {
        Ok(user::Entity::find()
            .filter(user::Column::LoginName.eq(login_name))
            .count(self.conn)
            .await?
            > 0)
    }

    pub async fn count(&self) -> Result<u64, DbErr> {
        Self::live().count(self.conn).await
    }

    pub async fn find_page(
        &self,
        filter: &SysUserFilter,
        page: &PageRequest<user::Column>,
    ) -> Result<(Vec<user::Model>, u64), DbErr> {
        let mut select = Self::live();
        let text_filters = [
            (user::Column::UserName, filter.user_name.as_deref()),
            (user::Column::LoginName, filter.login_name.as_deref()),
            (user::Column::Email, filter.email.as_deref()),
            (user::Column::Phone, filter.phone.as_deref()),
        ];
        for (column, term) in text_filters {
            if let Some(pattern) = like_pattern(term) {
                select = select.filter(column.like(LikeExpr::new(pattern).escape('\\')));
            }
        }
        if let Some(gender) = filter.gender {
            select = select.filter(user::Column::Gender.eq(gender));
        }
        super::fetch_page(self.conn, select, page, (user::Column::Id, Order::Asc)).await
    }

    pub async fn insert(&self, model: user::ActiveModel) -> Result<user::Model, DbErr> {
        model.insert(self.conn).await
    }

    pub async fn update(&self, model: user::ActiveModel) -> Result<user::Model, DbErr> {
        model.update(self.conn).await
    }

    pub async fn update_password(&self, id: i32, password_hash: &str) -> Result<bool, DbErr> {
        let result = user::Entity::update_many()
            .col_expr(user::Column::Password, password_hash.into())
            .col_expr(user::Column::UpdatedAt, Utc::now().into())
            .filter(user::Column::Id.eq(id))
            .filter(user::Column::DeletedAt.is_null())
            .exec(self.conn)
            .await?;
        Ok(result.rows_affected > 0)
    }

    pub async fn soft_delete(&self, id: i32) -> Result<bool, DbErr> {
        let now = Utc::now();
        let result = user::Entity::update_many()
            .col_expr(user::Column::DeletedAt, Some(now).into())
            .col_expr(user::Column::UpdatedAt, now.into())
            .filter(user::Column::Id.eq(id))
            .filter(user::Column::DeletedAt.is_null())
            .exec(self.conn)
            .await?;
        Ok(result.rows_affected > 0)
    }

    pub async fn role_ids(&self, user_id: i32) -> Result<Vec<i32>, DbErr> {
        user_role::Entity::find()
            .select_only()
            .column(user_role::Column::RoleId)
            .filter(user_role::Column::UserId.eq(user_id))
            .order_by_asc(user_role::Column::RoleId)
            .into_tuple()
            .all(self.conn)
            .await
    }

    /// `(user_id, role_id)` links for a batch of users.
    pub async fn role_links(&self, user_ids: &[i32]) -> Result<Vec<(i32, i32)>, DbErr> {
        if user_ids.is_empty() {
            return Ok(Vec::new());
        }
        user_role::Entity::find()
            .select_only()
            .column(user_role::Column::UserId)
            .column(user_role::Column::RoleId)
            .filter(user_role::Column::UserId.is_in(user_ids.iter().copied()))
            .order_by_asc(user_role::Column::RoleId)
            .into_tuple()
            .all(self.conn)
            .await
    }

    pub async fn clear_roles(&self, user_id: i32) -> Result<u64, DbErr> {
        let result = user_role::Entity::delete_many()
            .filter(user_role::Column::UserId.eq(user_id))
            .exec(self.conn)
            .await?;
        Ok(result.rows_affected)
    }

    pub async fn grant_roles(&self, user_id: i32, role_ids: &[i32]) -> Result<(), DbErr> {
        if role_ids.is_empty() {
            return Ok(());
        }
        let links = role_ids.iter().map(|&role_id| user_role::ActiveModel {
            user_id: Set(user_id),
            role_id: Set(role_id),
        });
        user_role::Entity::insert_many(links)
            .exec_without_returning(self.conn)
            .await?;
        Ok(())
    }
}
