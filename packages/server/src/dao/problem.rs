use chrono::Utc;
use sea_orm::sea_query::{LikeExpr, Query as SeaQuery};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, Order, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Select, Set,
};

use crate::entity::{problem, problem_menu_problem};
use crate::models::problem::ProblemFilter;
use crate::models::shared::{PageRequest, like_pattern};

pub struct ProblemDao<'a, C: ConnectionTrait> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> ProblemDao<'a, C> {
    pub fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    fn live() -> Select<problem::Entity> {
        problem::Entity::find().filter(problem::Column::DeletedAt.is_null())
    }

    pub async fn find_by_id(&self, id: i32) -> Result<Option<problem::Model>, DbErr> {
        Self::live()
            .filter(problem::Column::Id.eq(id))
            .one(self.conn)
            .await
    }

    pub async fn find_by_number(&self, number: &str) -> Result<Option<problem::Model>, DbErr> {
        Self::live()
            .filter(problem::Column::Number.eq(number))
            .one(self.conn)
            .await
    }

    /// Numbers are never reused, so soft-deleted problems still hold theirs.
    pub async fn number_taken(&self, number: &str, except_id: Option<i32>) -> Result<bool, DbErr> {
        let mut select = problem::Entity::find().filter(problem::Column::Number.eq(number));
        if let Some(id) = except_id {
            select = select.filter(problem::Column::Id.ne(id));
        }
        Ok(select.count(self.conn).await? > 0)
    }

    /// `(id, name)` pairs for the given ids, deleted problems included.
    pub async fn names(&self, ids: &[i32]) -> Result<Vec<(i32, String)>, DbErr> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        problem::Entity::find()
            .select_only()
            .column(problem::Column::Id)
            .column(problem::Column::Name)
            .filter(problem::Column::Id.is_in(ids.iter().copied()))
            .into_tuple()
            .all(self.conn)
            .await
    }

    pub async fn find_page(
        &self,
        filter: &ProblemFilter,
        page: &PageRequest<problem::Column>,
    ) -> Result<(Vec<problem::Model>, u64), DbErr> {
        let mut select = Self::live();
        if let Some(pattern) = like_pattern(filter.number.as_deref()) {
            select = select.filter(problem::Column::Number.like(LikeExpr::new(pattern).escape('\\')));
        }
        if let Some(pattern) = like_pattern(filter.name.as_deref()) {
            select = select.filter(problem::Column::Name.like(LikeExpr::new(pattern).escape('\\')));
        }
        if let Some(difficulty) = filter.difficulty {
            select = select.filter(problem::Column::Difficulty.eq(difficulty));
        }
        if let Some(enable) = filter.enable {
            select = select.filter(problem::Column::Enable.eq(enable));
        }
        if let Some(menu_id) = filter.menu_id {
            select = select.filter(
                problem::Column::Id.in_subquery(
                    SeaQuery::select()
                        .column(problem_menu_problem::Column::ProblemId)
                        .from(problem_menu_problem::Entity)
                        .and_where(problem_menu_problem::Column::ProblemMenuId.eq(menu_id))
                        .to_owned(),
                ),
            );
        }
        super::fetch_page(self.conn, select, page, (problem::Column::Id, Order::Asc)).await
    }

    pub async fn insert(&self, model: problem::ActiveModel) -> Result<problem::Model, DbErr> {
        model.insert(self.conn).await
    }

    pub async fn update(&self, model: problem::ActiveModel) -> Result<problem::Model, DbErr> {
        model.update(self.conn).await
    }

    pub async fn update_enable(&self, id: i32, enable: i32) -> Result<bool, DbErr> {
        let result = problem::Entity::update_many()
            .col_expr(problem::Column::Enable, enable.into())
            .col_expr(problem::Column::UpdatedAt, Utc::now().into())
            .filter(problem::Column::Id.eq(id))
            .filter(problem::Column::DeletedAt.is_null())
            .exec(self.conn)
            .await?;
        Ok(result.rows_affected > 0)
    }

    pub async fn soft_delete(&self, id: i32) -> Result<bool, DbErr> {
        let now = Utc::now();
        let result = problem::Entity::update_many()
            .col_expr(problem::Column::DeletedAt, Some(now).into())
            .col_expr(problem::Column::UpdatedAt, now.into())
            .filter(problem::Column::Id.eq(id))
            .filter(problem::Column::DeletedAt.is_null())
            .exec(self.conn)
            .await?;
        Ok(result.rows_affected > 0)
    }

    pub async fn menu_ids(&self, problem_id: i32) -> Result<Vec<i32>, DbErr> {
        problem_menu_problem::Entity::find()
            .select_only()
            .column(problem_menu_problem::Column::ProblemMenuId)
            .filter(problem_menu_problem::Column::ProblemId.eq(problem_id))
            .order_by_asc(problem_menu_problem::Column::ProblemMenuId)
            .into_tuple()
            .all(self.conn)
            .await
    }

    pub async fn clear_menus(&self, problem_id: i32) -> Result<u64, DbErr> {
        let result = problem_menu_problem::Entity::delete_many()
            .filter(problem_menu_problem::Column::ProblemId.eq(problem_id))
            .exec(self.conn)
            .await?;
        Ok(result.rows_affected)
    }

    pub async fn add_to_menus(&self, problem_id: i32, menu_ids: &[i32]) -> Result<(), DbErr> {
        if menu_ids.is_empty() {
            return Ok(());
        }
        let links = menu_ids
            .iter()
            .map(|&problem_menu_id| problem_menu_problem::ActiveModel {
                problem_menu_id: Set(problem_menu_id),
                problem_id: Set(problem_id),
            });
        problem_menu_problem::Entity::insert_many(links)
            .exec_without_returning(self.conn)
            .await?;
        Ok(())
    }
}
