use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A named problem set.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "problem_menu")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub name: String,
    /// Public URL of the icon.
    pub icon: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub creator_id: i32,

    #[sea_orm(has_many)]
    pub problem_links: HasMany<super::problem_menu_problem::Entity>,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
    pub deleted_at: Option<DateTimeUtc>,
}

impl ActiveModelBehavior for ActiveModel {}
