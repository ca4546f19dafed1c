use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QuerySelect,
};

use crate::entity::problem_attempt;

pub struct ProblemAttemptDao<'a, C: ConnectionTrait> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> ProblemAttemptDao<'a, C> {
    pub fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    pub async fn find(
        &self,
        user_id: i32,
        problem_id: i32,
    ) -> Result<Option<problem_attempt::Model>, DbErr> {
        problem_attempt::Entity::find()
            .filter(problem_attempt::Column::UserId.eq(user_id))
            .filter(problem_attempt::Column::ProblemId.eq(problem_id))
            .filter(problem_attempt::Column::DeletedAt.is_null())
            .one(self.conn)
            .await
    }

    /// `(problem_id, status)` of the user's attempts on `problem_ids`.
    pub async fn statuses(
        &self,
        user_id: i32,
        problem_ids: &[i32],
    ) -> Result<Vec<(i32, i32)>, DbErr> {
        if problem_ids.is_empty() {
            return Ok(Vec::new());
        }
        problem_attempt::Entity::find()
            .select_only()
            .column(problem_attempt::Column::ProblemId)
            .column(problem_attempt::Column::Status)
            .filter(problem_attempt::Column::UserId.eq(user_id))
            .filter(problem_attempt::Column::ProblemId.is_in(problem_ids.iter().copied()))
            .filter(problem_attempt::Column::DeletedAt.is_null())
            .into_tuple()
            .all(self.conn)
            .await
    }

    pub async fn insert(
        &self,
        model: problem_attempt::ActiveModel,
    ) -> Result<problem_attempt::Model, DbErr> {
        model.insert(self.conn).await
    }

    pub async fn update(
        &self,
        model: problem_attempt::ActiveModel,
    ) -> Result<problem_attempt::Model, DbErr> {
        model.update(self.conn).await
    }
}
