use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// `enable` value of a problem hidden from users.
pub const DISABLED: i32 = -1;
/// `enable` value of a problem listed to users.
pub const ENABLED: i32 = 1;

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "problem")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub creator_id: i32,
    /// Human-facing identifier, unique across all problems ever created.
    #[sea_orm(unique)]
    pub number: String,
    pub name: String,
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub description: String, // in Markdown
    /// 1 (easiest) to 5.
    pub difficulty: i32,
    /// -1 disabled, 0 unset, 1 enabled.
    pub enable: i32,
    /// Comma-separated language names.
    pub languages: String,

    #[sea_orm(has_many)]
    pub cases: HasMany<super::problem_case::Entity>,

    #[sea_orm(has_many)]
    pub menu_links: HasMany<super::problem_menu_problem::Entity>,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
    pub deleted_at: Option<DateTimeUtc>,
}

impl ActiveModelBehavior for ActiveModel {}
