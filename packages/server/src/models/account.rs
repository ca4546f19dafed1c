use chrono::{Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::entity::user;

/// Profile of the signed-in user.
#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AccountInfoResponse {
    pub avatar: String,
    #[schema(example = "ailisi123")]
    pub login_name: String,
    #[schema(example = "爱丽丝")]
    pub user_name: String,
    pub email: String,
    pub phone: String,
    pub introduction: String,
    /// 1 male, 2 female.
    #[schema(example = 1)]
    pub gender: i32,
    #[schema(example = "2001-04-09")]
    pub birthday: String,
    /// Whole years since the account was created.
    #[schema(example = 2)]
    pub coding_age: i32,
}

impl From<user::Model> for AccountInfoResponse {
    fn from(u: user::Model) -> Self {
        Self {
            coding_age: Utc::now().year() - u.created_at.year(),
            birthday: u.birthday.format("%Y-%m-%d").to_string(),
            avatar: u.avatar,
            login_name: u.login_name,
            user_name: u.user_name,
            email: u.email,
            phone: u.phone,
            introduction: u.introduction,
            gender: u.gender,
        }
    }
}

/// Editable profile fields. Absent fields keep their value.
#[derive(Debug, Default, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAccountRequest {
    pub avatar: Option<String>,
    pub user_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub introduction: Option<String>,
    pub gender: Option<i32>,
    #[schema(value_type = Option<String>, example = "2001-04-09")]
    pub birthday: Option<NaiveDate>,
}

#[derive(Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub old_password: String,
    /// At least 6 characters.
    pub new_password: String,
}
