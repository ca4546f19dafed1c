use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::entity::user;

#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query, rename_all = "camelCase")]
pub struct SysUserFilter {
    pub user_name: Option<String>,
    pub login_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub gender: Option<i32>,
}

/// Body of admin user create and update. On update, absent fields keep
/// their value.
#[derive(Debug, Default, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SysUserRequest {
    pub avatar: Option<String>,
    pub user_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub introduction: Option<String>,
    /// 1 male, 2 female.
    pub gender: Option<i32>,
    #[schema(value_type = Option<String>, example = "2001-04-09")]
    pub birthday: Option<NaiveDate>,
}

#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SysUserResponse {
    #[schema(example = 42)]
    pub id: i32,
    pub avatar: String,
    pub user_name: String,
    pub login_name: String,
    pub email: String,
    pub phone: String,
    pub introduction: String,
    pub gender: i32,
    #[schema(value_type = String, example = "2001-04-09")]
    pub birthday: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Names of the user's roles. Only filled in listings.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub role_names: Vec<String>,
}

impl From<user::Model> for SysUserResponse {
    fn from(m: user::Model) -> Self {
        Self {
            id: m.id,
            avatar: m.avatar,
            user_name: m.user_name,
            login_name: m.login_name,
            email: m.email,
            phone: m.phone,
            introduction: m.introduction,
            gender: m.gender,
            birthday: m.birthday,
            created_at: m.created_at,
            updated_at: m.updated_at,
            role_names: Vec::new(),
        }
    }
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RoleIdsRequest {
    #[schema(example = json!([2]))]
    pub role_ids: Vec<i32>,
}

/// Gender stored for a user: 1 or 2, anything else becomes 1.
pub fn normalize_gender(gender: Option<i32>) -> i32 {
    match gender {
        Some(g @ (1 | 2)) => g,
        _ => 1,
    }
}
