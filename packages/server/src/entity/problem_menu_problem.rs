use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "problem_menu_problem")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub problem_menu_id: i32,
    #[sea_orm(primary_key, auto_increment = false)]
    pub problem_id: i32,
    #[sea_orm(belongs_to, from = "problem_menu_id", to = "id")]
    pub problem_menu: HasOne<super::problem_menu::Entity>,
    #[sea_orm(belongs_to, from = "problem_id", to = "id")]
    pub problem: HasOne<super::problem::Entity>,
}

impl ActiveModelBehavior for ActiveModel {}
