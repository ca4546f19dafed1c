use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entity::role;

#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RoleFilter {
    pub name: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct RoleRequest {
    #[schema(example = "setter")]
    pub name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RoleResponse {
    #[schema(example = 2)]
    pub id: i32,
    #[schema(example = "user")]
    pub name: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<role::Model> for RoleResponse {
    fn from(m: role::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            description: m.description,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PermissionIdsRequest {
    /// Replaces the role's whole grant set. Duplicates are ignored.
    #[schema(example = json!([1, 2, 5]))]
    pub permission_ids: Vec<i32>,
}
