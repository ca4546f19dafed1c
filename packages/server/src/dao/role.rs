use chrono::Utc;
use sea_orm::sea_query::LikeExpr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, Order, QueryFilter,
    QueryOrder, QuerySelect, Select, Set,
};

use crate::entity::{role, role_permission, user_role};
use crate::models::role::RoleFilter;
use crate::models::shared::{PageRequest, like_pattern};

pub struct RoleDao<'a, C: ConnectionTrait> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> RoleDao<'a, C> {
    pub fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    fn live() -> Select<role::Entity> {
        role::Entity::find().filter(role::Column::DeletedAt.is_null())
    }

    pub async fn find_by_id(&self, id: i32) -> Result<Option<role::Model>, DbErr> {
        Self::live()
            .filter(role::Column::Id.eq(id))
            .one(self.conn)
            .await
    }

    pub async fn find_by_name(&self, name: &str) -> Result<Option<role::Model>, DbErr> {
        Self::live()
            .filter(role::Column::Name.eq(name))
            .one(self.conn)
            .await
    }

    pub async fn find_by_ids(&self, ids: &[i32]) -> Result<Vec<role::Model>, DbErr> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        Self::live()
            .filter(role::Column::Id.is_in(ids.iter().copied()))
            .order_by_asc(role::Column::Id)
            .all(self.conn)
            .await
    }

    pub async fn find_all(&self) -> Result<Vec<role::Model>, DbErr> {
        Self::live()
            .order_by_asc(role::Column::Id)
            .all(self.conn)
            .await
    }

    pub async fn find_page(
        &self,
        filter: &RoleFilter,
        page: &PageRequest<role::Column>,
    ) -> Result<(Vec<role::Model>, u64), DbErr> {
        let mut select = Self::live();
        if let Some(pattern) = like_pattern(filter.name.as_deref()) {
            select = select.filter(role::Column::Name.like(LikeExpr::new(pattern).escape('\\')));
        }
        if let Some(pattern) = like_pattern(filter.description.as_deref()) {
            select = select
                .filter(role::Column::Description.like(LikeExpr::new(pattern).escape('\\')));
        }
        super::fetch_page(self.conn, select, page, (role::Column::Id, Order::Asc)).await
    }

    pub async fn insert(&self, model: role::ActiveModel) -> Result<role::Model, DbErr> {
        model.insert(self.conn).await
    }

    pub async fn update(&self, model: role::ActiveModel) -> Result<role::Model, DbErr> {
        model.update(self.conn).await
    }

    pub async fn soft_delete(&self, id: i32) -> Result<bool, DbErr> {
        let now = Utc::now();
        let result = role::Entity::update_many()
            .col_expr(role::Column::DeletedAt, Some(now).into())
            .col_expr(role::Column::UpdatedAt, now.into())
            .filter(role::Column::Id.eq(id))
            .filter(role::Column::DeletedAt.is_null())
            .exec(self.conn)
            .await?;
        Ok(result.rows_affected > 0)
    }

    pub async fn permission_ids(&self, role_id: i32) -> Result<Vec<i32>, DbErr> {
        role_permission::Entity::find()
            .select_only()
            .column(role_permission::Column::PermissionId)
            .filter(role_permission::Column::RoleId.eq(role_id))
            .order_by_asc(role_permission::Column::PermissionId)
            .into_tuple()
            .all(self.conn)
            .await
    }

    /// Permission ids granted to any of `role_ids`, without duplicates.
    pub async fn permission_ids_of_roles(&self, role_ids: &[i32]) -> Result<Vec<i32>, DbErr> {
        if role_ids.is_empty() {
            return Ok(Vec::new());
        }
        role_permission::Entity::find()
            .select_only()
            .column(role_permission::Column::PermissionId)
            .filter(role_permission::Column::RoleId.is_in(role_ids.iter().copied()))
            .distinct()
            .order_by_asc(role_permission::Column::PermissionId)
            .into_tuple()
            .all(self.conn)
            .await
    }

    pub async fn clear_permissions(&self, role_id: i32) -> Result<u64, DbErr> {
        let result = role_permission::Entity::delete_many()
            .filter(role_permission::Column::RoleId.eq(role_id))
            .exec(self.conn)
            .await?;
        Ok(result.rows_affected)
    }

    pub async fn grant_permissions(&self, role_id: i32, permission_ids: &[i32]) -> Result<(), DbErr> {
        if permission_ids.is_empty() {
            return Ok(());
        }
        let links = permission_ids.iter().map(|&permission_id| role_permission::ActiveModel {
            role_id: Set(role_id),
            permission_id: Set(permission_id),
        });
        role_permission::Entity::insert_many(links)
            .exec_without_returning(self.conn)
            .await?;
        Ok(())
    }

    /// Drop the permission links of every role pointing at `permission_ids`.
    pub async fn revoke_permission_everywhere(&self, permission_ids: &[i32]) -> Result<u64, DbErr> {
        if permission_ids.is_empty() {
            return Ok(0);
        }
        let result = role_permission::Entity::delete_many()
            .filter(role_permission::Column::PermissionId.is_in(permission_ids.iter().copied()))
            .exec(self.conn)
            .await?;
        Ok(result.rows_affected)
    }

    pub async fn clear_users(&self, role_id: i32) -> Result<u64, DbErr> {
        let result = user_role::Entity::delete_many()
            .filter(user_role::Column::RoleId.eq(role_id))
            .exec(self.conn)
            .await?;
        Ok(result.rows_affected)
    }
}
