use chrono::Utc;
use sea_orm::sea_query::LikeExpr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, Order, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Select,
};

use crate::entity::{problem_menu, problem_menu_problem};
use crate::models::problem_menu::ProblemMenuFilter;
use crate::models::shared::{PageRequest, like_pattern};

pub struct ProblemMenuDao<'a, C: ConnectionTrait> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> ProblemMenuDao<'a, C> {
    pub fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    fn live() -> Select<problem_menu::Entity> {
        problem_menu::Entity::find().filter(problem_menu::Column::DeletedAt.is_null())
    }

    pub async fn find_by_id(&self, id: i32) -> Result<Option<problem_menu::Model>, DbErr> {
        Self::live()
            .filter(problem_menu::Column::Id.eq(id))
            .one(self.conn)
            .await
    }

    pub async fn find_all(&self) -> Result<Vec<problem_menu::Model>, DbErr> {
        Self::live()
            .order_by_asc(problem_menu::Column::Id)
            .all(self.conn)
            .await
    }

    pub async fn find_simple(&self) -> Result<Vec<(i32, String)>, DbErr> {
        Self::live()
            .select_only()
            .column(problem_menu::Column::Id)
            .column(problem_menu::Column::Name)
            .order_by_asc(problem_menu::Column::Id)
            .into_tuple()
            .all(self.conn)
            .await
    }

    pub async fn count_by_ids(&self, ids: &[i32]) -> Result<u64, DbErr> {
        if ids.is_empty() {
            return Ok(0);
        }
        Self::live()
            .filter(problem_menu::Column::Id.is_in(ids.iter().copied()))
            .count(self.conn)
            .await
    }

    pub async fn find_page(
        &self,
        filter: &ProblemMenuFilter,
        page: &PageRequest<problem_menu::Column>,
    ) -> Result<(Vec<problem_menu::Model>, u64), DbErr> {
        let mut select = Self::live();
        if let Some(pattern) = like_pattern(filter.name.as_deref()) {
            select =
                select.filter(problem_menu::Column::Name.like(LikeExpr::new(pattern).escape('\\')));
        }
        if let Some(pattern) = like_pattern(filter.description.as_deref()) {
            select = select.filter(
                problem_menu::Column::Description.like(LikeExpr::new(pattern).escape('\\')),
            );
        }
        super::fetch_page(self.conn, select, page, (problem_menu::Column::Id, Order::Asc)).await
    }

    pub async fn insert(
        &self,
        model: problem_menu::ActiveModel,
    ) -> Result<problem_menu::Model, DbErr> {
        model.insert(self.conn).await
    }

    pub async fn update(
        &self,
        model: problem_menu::ActiveModel,
    ) -> Result<problem_menu::Model, DbErr> {
        model.update(self.conn).await
    }

    pub async fn soft_delete(&self, id: i32) -> Result<bool, DbErr> {
        let now = Utc::now();
        let result = problem_menu::Entity::update_many()
            .col_expr(problem_menu::Column::DeletedAt, Some(now).into())
            .col_expr(problem_menu::Column::UpdatedAt, now.into())
            .filter(problem_menu::Column::Id.eq(id))
            .filter(problem_menu::Column::DeletedAt.is_null())
            .exec(self.conn)
            .await?;
        Ok(result.rows_affected > 0)
    }

    pub async fn problem_count(&self, menu_id: i32) -> Result<u64, DbErr> {
        problem_menu_problem::Entity::find()
            .filter(problem_menu_problem::Column::ProblemMenuId.eq(menu_id))
            .count(self.conn)
            .await
    }

    /// `(menu_id, problem_count)` for each of `menu_ids` that has problems.
    pub async fn problem_counts(&self, menu_ids: &[i32]) -> Result<Vec<(i32, i64)>, DbErr> {
        if menu_ids.is_empty() {
            return Ok(Vec::new());
        }
        problem_menu_problem::Entity::find()
            .select_only()
            .column(problem_menu_problem::Column::ProblemMenuId)
            .column_as(problem_menu_problem::Column::ProblemId.count(), "problem_count")
            .filter(problem_menu_problem::Column::ProblemMenuId.is_in(menu_ids.iter().copied()))
            .group_by(problem_menu_problem::Column::ProblemMenuId)
            .into_tuple()
            .all(self.conn)
            .await
    }

    pub async fn clear_problems(&self, menu_id: i32) -> Result<u64, DbErr> {
        let result = problem_menu_problem::Entity::delete_many()
            .filter(problem_menu_problem::Column::ProblemMenuId.eq(menu_id))
            .exec(self.conn)
            .await?;
        Ok(result.rows_affected)
    }
}
