use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, Order, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Select,
};

use crate::entity::submission;
use crate::models::shared::PageRequest;

pub struct SubmissionDao<'a, C: ConnectionTrait> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> SubmissionDao<'a, C> {
    pub fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    fn of_user(user_id: i32) -> Select<submission::Entity> {
        submission::Entity::find()
            .filter(submission::Column::UserId.eq(user_id))
            .filter(submission::Column::DeletedAt.is_null())
    }

    pub async fn insert(
        &self,
        model: submission::ActiveModel,
    ) -> Result<submission::Model, DbErr> {
        model.insert(self.conn).await
    }

    /// The user's submissions, newest first unless the request sorts otherwise.
    pub async fn find_page_by_user(
        &self,
        user_id: i32,
        page: &PageRequest<submission::Column>,
    ) -> Result<(Vec<submission::Model>, u64), DbErr> {
        super::fetch_page(
            self.conn,
            Self::of_user(user_id),
            page,
            (submission::Column::CreatedAt, Order::Desc),
        )
        .await
    }

    /// Creation times of the user's submissions in `[start, end)`.
    pub async fn created_times(
        &self,
        user_id: i32,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<DateTime<Utc>>, DbErr> {
        Self::of_user(user_id)
            .select_only()
            .column(submission::Column::CreatedAt)
            .filter(submission::Column::CreatedAt.gte(start))
            .filter(submission::Column::CreatedAt.lt(end))
            .into_tuple()
            .all(self.conn)
            .await
    }

    pub async fn exists_between(
        &self,
        user_id: i32,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<bool, DbErr> {
        Ok(Self::of_user(user_id)
            .filter(submission::Column::CreatedAt.gte(start))
            .filter(submission::Column::CreatedAt.lt(end))
            .count(self.conn)
            .await?
            > 0)
    }
}
