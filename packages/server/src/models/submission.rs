use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entity::submission;

/// Outcome of one judge run, stored as its numeric code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum SubmissionStatus {
    Accepted = 1,
    WrongAnswer = 2,
    CompileError = 3,
    RuntimeError = 4,
    TimeLimitExceeded = 5,
    MemoryLimitExceeded = 6,
    SystemError = 7,
}

impl SubmissionStatus {
    pub fn code(self) -> i32 {
        self as i32
    }
}

impl TryFrom<i32> for SubmissionStatus {
    type Error = i32;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        Ok(match code {
            1 => SubmissionStatus::Accepted,
            2 => SubmissionStatus::WrongAnswer,
            3 => SubmissionStatus::CompileError,
            4 => SubmissionStatus::RuntimeError,
            5 => SubmissionStatus::TimeLimitExceeded,
            6 => SubmissionStatus::MemoryLimitExceeded,
            7 => SubmissionStatus::SystemError,
            other => return Err(other),
        })
    }
}

/// A user's progress on one problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum AttemptStatus {
    NotStarted = 0,
    InProgress = 1,
    Solved = 2,
}

impl AttemptStatus {
    pub fn code(self) -> i32 {
        self as i32
    }

    /// Status after one more submission with `outcome`. Solved is sticky.
    pub fn after(previous: i32, outcome: SubmissionStatus) -> Self {
        if outcome == SubmissionStatus::Accepted || previous == AttemptStatus::Solved.code() {
            AttemptStatus::Solved
        } else {
            AttemptStatus::InProgress
        }
    }
}

/// Judge callback body.
#[derive(Debug, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecordSubmissionRequest {
    pub user_id: i32,
    pub problem_id: i32,
    #[schema(example = "cpp")]
    pub language: String,
    pub code: String,
    /// 1 accepted, 2 wrong answer, 3 compile error, 4 runtime error,
    /// 5 time limit, 6 memory limit, 7 system error.
    #[schema(example = 1)]
    pub status: i32,
    #[serde(default)]
    pub error_message: String,
    #[serde(default)]
    pub case_name: String,
    #[serde(default)]
    pub case_data: String,
    #[serde(default)]
    pub expected_output: String,
    #[serde(default)]
    pub user_output: String,
    /// Milliseconds.
    #[serde(default)]
    pub time_used: i64,
    /// Bytes.
    #[serde(default)]
    pub memory_used: i64,
}

#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionListItem {
    pub id: i32,
    pub problem_id: i32,
    #[schema(example = "A+B")]
    pub problem_name: String,
    pub language: String,
    pub status: i32,
    pub error_message: String,
    pub time_used: i64,
    pub memory_used: i64,
    pub created_at: DateTime<Utc>,
}

impl SubmissionListItem {
    pub fn new(m: submission::Model, problem_name: String) -> Self {
        Self {
            id: m.id,
            problem_id: m.problem_id,
            problem_name,
            language: m.language,
            status: m.status,
            error_message: m.error_message,
            time_used: m.time_used,
            memory_used: m.memory_used,
            created_at: m.created_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, utoipa::ToSchema)]
pub struct ActivityItem {
    #[schema(example = "2024-03-07")]
    pub date: String,
    #[schema(example = 4)]
    pub count: u32,
}

#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ActivityQuery {
    /// Calendar year, or 0 / absent for the last year ending today.
    #[serde(default)]
    #[param(example = 2024)]
    pub year: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_parse() {
        assert_eq!(SubmissionStatus::try_from(1), Ok(SubmissionStatus::Accepted));
        assert_eq!(SubmissionStatus::try_from(5), Ok(SubmissionStatus::TimeLimitExceeded));
        assert_eq!(SubmissionStatus::try_from(0), Err(0));
    }

    #[test]
    fn solved_attempts_stay_solved() {
        assert_eq!(
            AttemptStatus::after(0, SubmissionStatus::WrongAnswer),
            AttemptStatus::InProgress
        );
        assert_eq!(
            AttemptStatus::after(1, SubmissionStatus::Accepted),
            AttemptStatus::Solved
        );
        assert_eq!(
            AttemptStatus::after(2, SubmissionStatus::CompileError),
            AttemptStatus::Solved
        );
    }
}
