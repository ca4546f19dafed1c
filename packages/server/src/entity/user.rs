use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub avatar: String,
    /// Display name.
    pub user_name: String,
    #[sea_orm(unique)]
    pub login_name: String,
    #[serde(skip_serializing)]
    pub password: String,
    #[sea_orm(indexed)]
    pub email: String,
    pub phone: String,
    #[sea_orm(column_type = "Text")]
    pub introduction: String,
    /// 1 male, 2 female.
    pub gender: i32,
    pub birthday: Date,

    #[sea_orm(has_many)]
    pub role_links: HasMany<super::user_role::Entity>,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
    pub deleted_at: Option<DateTimeUtc>,
}

impl ActiveModelBehavior for ActiveModel {}
