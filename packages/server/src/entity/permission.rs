use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Parent id marking a root of the permission forest.
pub const ROOT_PARENT_ID: i32 = 0;

/// A node in the permission forest. `parent_id == 0` marks a root.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "permission")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(indexed)]
    pub parent_id: i32,
    /// Permission code checked by handlers, e.g. `problem:manage`.
    pub code: String,
    pub name: String,
    pub description: String,
    pub category: String,
    pub method: String,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
    pub deleted_at: Option<DateTimeUtc>,
}

impl ActiveModelBehavior for ActiveModel {}
