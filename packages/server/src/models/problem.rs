use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entity::problem;

#[derive(Debug, Default, Clone, Deserialize, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query, rename_all = "camelCase")]
pub struct ProblemFilter {
    /// Substring of the problem number.
    pub number: Option<String>,
    /// Substring of the problem name.
    pub name: Option<String>,
    pub difficulty: Option<i32>,
    /// -1 disabled, 1 enabled.
    pub enable: Option<i32>,
    /// Only problems in this menu.
    pub menu_id: Option<i32>,
}

/// Body of problem create and update.
///
/// On create, absent fields get defaults. On update, absent fields keep
/// their value; `menuIds`, when present, replaces the menu links.
#[derive(Debug, Default, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProblemRequest {
    #[schema(example = "P1001")]
    pub number: Option<String>,
    #[schema(example = "A+B")]
    pub name: Option<String>,
    pub title: Option<String>,
    /// Markdown.
    pub description: Option<String>,
    /// 1 to 5; anything else becomes 1.
    #[schema(example = 2)]
    pub difficulty: Option<i32>,
    /// Comma-separated language names.
    #[schema(example = "cpp,java,python")]
    pub languages: Option<String>,
    #[schema(example = json!([1]))]
    pub menu_ids: Option<Vec<i32>>,
}

#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProblemResponse {
    #[schema(example = 7)]
    pub id: i32,
    pub creator_id: i32,
    #[schema(example = "P1001")]
    pub number: String,
    pub name: String,
    pub title: String,
    pub description: String,
    pub difficulty: i32,
    pub enable: i32,
    pub languages: String,
    pub menu_ids: Vec<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProblemResponse {
    pub fn new(m: problem::Model, menu_ids: Vec<i32>) -> Self {
        Self {
            id: m.id,
            creator_id: m.creator_id,
            number: m.number,
            name: m.name,
            title: m.title,
            description: m.description,
            difficulty: m.difficulty,
            enable: m.enable,
            languages: m.languages,
            menu_ids,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProblemListItem {
    pub id: i32,
    pub number: String,
    pub name: String,
    pub title: String,
    pub difficulty: i32,
    pub enable: i32,
    pub languages: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Caller's attempt status (0 not started, 1 tried, 2 solved). Only in
    /// the public listing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<i32>,
}

impl From<problem::Model> for ProblemListItem {
    fn from(m: problem::Model) -> Self {
        Self {
            id: m.id,
            number: m.number,
            name: m.name,
            title: m.title,
            difficulty: m.difficulty,
            enable: m.enable,
            languages: m.languages,
            created_at: m.created_at,
            updated_at: m.updated_at,
            status: None,
        }
    }
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct EnableRequest {
    /// -1 disabled, 1 enabled.
    #[schema(example = 1)]
    pub enable: i32,
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CheckNumberQuery {
    pub number: String,
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TemplateQuery {
    #[param(example = "cpp")]
    pub language: String,
}

/// Difficulty stored for a problem: 1 to 5, anything else becomes 1.
pub fn clamp_difficulty(difficulty: Option<i32>) -> i32 {
    match difficulty {
        Some(d @ 1..=5) => d,
        _ => 1,
    }
}

/// Whether `language` is one of the comma-separated `languages`.
pub fn supports_language(languages: &str, language: &str) -> bool {
    let language = language.trim();
    !language.is_empty() && languages.split(',').any(|l| l.trim() == language)
}
