use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Rolling per-(user, problem) record of submissions. One row per pair.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "problem_attempt")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(unique_key = "user_problem")]
    pub user_id: i32,
    #[sea_orm(unique_key = "user_problem")]
    pub problem_id: i32,

    pub submission_count: i32,
    pub success_count: i32,
    pub err_count: i32,
    /// Code of the latest submission.
    #[sea_orm(column_type = "Text")]
    pub code: String,
    pub language: String,
    /// See [`crate::models::submission::AttemptStatus`].
    pub status: i32,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
    pub deleted_at: Option<DateTimeUtc>,
}

impl ActiveModelBehavior for ActiveModel {}
