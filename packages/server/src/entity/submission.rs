use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One judge run. Rows are never updated after insert.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "submission")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub user_id: i32,
    #[sea_orm(belongs_to, from = "user_id", to = "id")]
    pub user: HasOne<super::user::Entity>,

    pub problem_id: i32,
    #[sea_orm(belongs_to, from = "problem_id", to = "id")]
    pub problem: HasOne<super::problem::Entity>,

    pub language: String,
    #[sea_orm(column_type = "Text")]
    pub code: String,
    /// See [`crate::models::submission::SubmissionStatus`].
    pub status: i32,
    #[sea_orm(column_type = "Text")]
    pub error_message: String,
    pub case_name: String,
    #[sea_orm(column_type = "Text")]
    pub case_data: String,
    #[sea_orm(column_type = "Text")]
    pub expected_output: String,
    #[sea_orm(column_type = "Text")]
    pub user_output: String,
    /// Milliseconds.
    pub time_used: i64,
    /// Bytes.
    pub memory_used: i64,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
    pub deleted_at: Option<DateTimeUtc>,
}

impl ActiveModelBehavior for ActiveModel {}
