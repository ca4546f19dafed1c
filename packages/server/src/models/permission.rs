use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entity::permission;

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PermissionResponse {
    #[schema(example = 3)]
    pub id: i32,
    /// 0 for roots.
    #[schema(example = 0)]
    pub parent_id: i32,
    #[schema(example = "problem:manage")]
    pub code: String,
    pub name: String,
    pub description: String,
    pub category: String,
    pub method: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<permission::Model> for PermissionResponse {
    fn from(m: permission::Model) -> Self {
        Self {
            id: m.id,
            parent_id: m.parent_id,
            code: m.code,
            name: m.name,
            description: m.description,
            category: m.category,
            method: m.method,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

/// A permission with its nested children.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PermissionTreeNode {
    pub id: i32,
    pub parent_id: i32,
    pub code: String,
    pub name: String,
    pub description: String,
    pub category: String,
    pub method: String,
    #[schema(no_recursion)]
    pub children: Vec<PermissionTreeNode>,
}

impl From<permission::Model> for PermissionTreeNode {
    fn from(m: permission::Model) -> Self {
        Self {
            id: m.id,
            parent_id: m.parent_id,
            code: m.code,
            name: m.name,
            description: m.description,
            category: m.category,
            method: m.method,
            children: Vec::new(),
        }
    }
}

/// Body of permission create and update. On update, absent fields keep
/// their value.
#[derive(Debug, Default, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PermissionRequest {
    /// 0 or absent for a root.
    pub parent_id: Option<i32>,
    #[schema(example = "problem:manage")]
    pub code: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    #[schema(example = "GET")]
    pub method: Option<String>,
}

#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PermissionFilter {
    /// Substring of the permission code.
    pub keyword: Option<String>,
}
