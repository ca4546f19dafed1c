use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entity::problem_menu;

#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ProblemMenuFilter {
    pub name: Option<String>,
    pub description: Option<String>,
}

/// Body of menu create and update. On update, absent fields keep their
/// value.
#[derive(Debug, Default, Deserialize, utoipa::ToSchema)]
pub struct ProblemMenuRequest {
    #[schema(example = "入门")]
    pub name: Option<String>,
    /// URL returned by the icon upload.
    pub icon: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProblemMenuResponse {
    pub id: i32,
    pub name: String,
    pub icon: String,
    pub description: String,
    pub creator_id: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<problem_menu::Model> for ProblemMenuResponse {
    fn from(m: problem_menu::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            icon: m.icon,
            description: m.description,
            creator_id: m.creator_id,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProblemMenuListItem {
    pub id: i32,
    pub name: String,
    pub icon: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Display name of the creator; empty when the account is gone.
    pub creator_name: String,
    #[schema(example = 12)]
    pub problem_count: i64,
}

#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DeleteMenuQuery {
    /// Also unlink member problems instead of refusing.
    #[serde(default)]
    pub force: bool,
}
