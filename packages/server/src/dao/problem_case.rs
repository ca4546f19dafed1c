use chrono::Utc;
use sea_orm::prelude::Expr;
use sea_orm::sea_query::{Func, LikeExpr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, Order, QueryFilter,
    QueryOrder, Select,
};

use crate::entity::problem_case;
use crate::models::problem_case::ProblemCaseFilter;
use crate::models::shared::{PageRequest, like_pattern};

pub struct ProblemCaseDao<'a, C: ConnectionTrait> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> ProblemCaseDao<'a, C> {
    pub fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    fn live() -> Select<problem_case::Entity> {
        problem_case::Entity::find().filter(problem_case::Column::DeletedAt.is_null())
    }

    pub async fn find_by_id(&self, id: i32) -> Result<Option<problem_case::Model>, DbErr> {
        Self::live()
            .filter(problem_case::Column::Id.eq(id))
            .one(self.conn)
            .await
    }

    /// Live cases of `problem_id` named exactly `case_name`.
    pub async fn find_by_name(
        &self,
        problem_id: i32,
        case_name: &str,
    ) -> Result<Vec<problem_case::Model>, DbErr> {
        Self::live()
            .filter(problem_case::Column::ProblemId.eq(problem_id))
            .filter(problem_case::Column::CaseName.eq(case_name))
            .all(self.conn)
            .await
    }

    /// The case whose name sorts last under `problem_id`.
    ///
    /// Longer names sort after shorter ones so that `case10` follows `case9`.
    pub async fn find_last_named(
        &self,
        problem_id: i32,
    ) -> Result<Option<problem_case::Model>, DbErr> {
        Self::live()
            .filter(problem_case::Column::ProblemId.eq(problem_id))
            .order_by(
                Expr::expr(Func::char_length(Expr::col(problem_case::Column::CaseName))),
                Order::Desc,
            )
            .order_by_desc(problem_case::Column::CaseName)
            .one(self.conn)
            .await
    }

    pub async fn find_page(
        &self,
        filter: &ProblemCaseFilter,
        page: &PageRequest<problem_case::Column>,
    ) -> Result<(Vec<problem_case::Model>, u64), DbErr> {
        let mut select = Self::live().filter(problem_case::Column::ProblemId.eq(filter.problem_id));
        if let Some(pattern) = like_pattern(filter.case_name.as_deref()) {
            select =
                select.filter(problem_case::Column::CaseName.like(LikeExpr::new(pattern).escape('\\')));
        }
        super::fetch_page(self.conn, select, page, (problem_case::Column::Id, Order::Asc)).await
    }

    pub async fn insert(
        &self,
        model: problem_case::ActiveModel,
    ) -> Result<problem_case::Model, DbErr> {
        model.insert(self.conn).await
    }

    pub async fn update(
        &self,
        model: problem_case::ActiveModel,
    ) -> Result<problem_case::Model, DbErr> {
        model.update(self.conn).await
    }

    pub async fn soft_delete(&self, id: i32) -> Result<bool, DbErr> {
        let now = Utc::now();
        let result = problem_case::Entity::update_many()
            .col_expr(problem_case::Column::DeletedAt, Some(now).into())
            .col_expr(problem_case::Column::UpdatedAt, now.into())
            .filter(problem_case::Column::Id.eq(id))
            .filter(problem_case::Column::DeletedAt.is_null())
            .exec(self.conn)
            .await?;
        Ok(result.rows_affected > 0)
    }

    pub async fn soft_delete_by_problem(&self, problem_id: i32) -> Result<u64, DbErr> {
        let now = Utc::now();
        let result = problem_case::Entity::update_many()
            .col_expr(problem_case::Column::DeletedAt, Some(now).into())
            .col_expr(problem_case::Column::UpdatedAt, now.into())
            .filter(problem_case::Column::ProblemId.eq(problem_id))
            .filter(problem_case::Column::DeletedAt.is_null())
            .exec(self.conn)
            .await?;
        Ok(result.rows_affected)
    }
}
