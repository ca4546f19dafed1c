use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entity::problem_case;

#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query, rename_all = "camelCase")]
pub struct ProblemCaseFilter {
    /// Taken from the path.
    #[serde(skip)]
    pub problem_id: i32,
    /// Substring of the case name.
    pub case_name: Option<String>,
}

#[derive(Debug, Default, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProblemCaseRequest {
    /// Empty or absent on create to get the next generated name.
    #[schema(example = "case3")]
    pub case_name: Option<String>,
    pub input: Option<String>,
    pub output: Option<String>,
}

#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProblemCaseResponse {
    pub id: i32,
    pub problem_id: i32,
    #[schema(example = "case3")]
    pub case_name: String,
    pub input: String,
    pub output: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<problem_case::Model> for ProblemCaseResponse {
    fn from(m: problem_case::Model) -> Self {
        Self {
            id: m.id,
            problem_id: m.problem_id,
            case_name: m.case_name,
            input: m.input,
            output: m.output,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CheckCaseNameQuery {
    /// Case being edited; a match on this id does not count.
    pub id: Option<i32>,
    pub name: String,
}
