use chrono::Utc;
use sea_orm::sea_query::LikeExpr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, Order, PaginatorTrait,
    QueryFilter, QueryOrder, Select,
};

use crate::entity::permission;
use crate::models::shared::{PageRequest, like_pattern};

pub struct PermissionDao<'a, C: ConnectionTrait> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> PermissionDao<'a, C> {
    pub fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    fn live() -> Select<permission::Entity> {
        permission::Entity::find().filter(permission::Column::DeletedAt.is_null())
    }

    pub async fn find_by_id(&self, id: i32) -> Result<Option<permission::Model>, DbErr> {
        Self::live()
            .filter(permission::Column::Id.eq(id))
            .one(self.conn)
            .await
    }

    pub async fn find_by_code(&self, code: &str) -> Result<Option<permission::Model>, DbErr> {
        Self::live()
            .filter(permission::Column::Code.eq(code))
            .one(self.conn)
            .await
    }

    pub async fn find_all(&self) -> Result<Vec<permission::Model>, DbErr> {
        Self::live()
            .order_by_asc(permission::Column::Id)
            .all(self.conn)
            .await
    }

    pub async fn find_by_ids(&self, ids: &[i32]) -> Result<Vec<permission::Model>, DbErr> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        Self::live()
            .filter(permission::Column::Id.is_in(ids.iter().copied()))
            .order_by_asc(permission::Column::Id)
            .all(self.conn)
            .await
    }

    pub async fn find_children(&self, parent_id: i32) -> Result<Vec<permission::Model>, DbErr> {
        Self::live()
            .filter(permission::Column::ParentId.eq(parent_id))
            .order_by_asc(permission::Column::Id)
            .all(self.conn)
            .await
    }

    pub async fn count(&self) -> Result<u64, DbErr> {
        Self::live().count(self.conn).await
    }

    /// Page through permissions whose code contains `keyword`.
    pub async fn find_page(
        &self,
        keyword: Option<&str>,
        page: &PageRequest<permission::Column>,
    ) -> Result<(Vec<permission::Model>, u64), DbErr> {
        let mut select = Self::live();
        if let Some(pattern) = like_pattern(keyword) {
            select = select.filter(permission::Column::Code.like(LikeExpr::new(pattern).escape('\\')));
        }
        super::fetch_page(self.conn, select, page, (permission::Column::Id, Order::Asc)).await
    }

    pub async fn insert(
        &self,
        model: permission::ActiveModel,
    ) -> Result<permission::Model, DbErr> {
        model.insert(self.conn).await
    }

    pub async fn update(
        &self,
        model: permission::ActiveModel,
    ) -> Result<permission::Model, DbErr> {
        model.update(self.conn).await
    }

    /// Soft-delete one permission row. Returns whether a live row was hit.
    pub async fn soft_delete(&self, id: i32) -> Result<bool, DbErr> {
        let now = Utc::now();
        let result = permission::Entity::update_many()
            .col_expr(permission::Column::DeletedAt, Some(now).into())
            .col_expr(permission::Column::UpdatedAt, now.into())
            .filter(permission::Column::Id.eq(id))
            .filter(permission::Column::DeletedAt.is_null())
            .exec(self.conn)
            .await?;
        Ok(result.rows_affected > 0)
    }
}
