// src/models/result.rs

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Represents the 'results' table: one scored attempt.
/// Rows are appended per submission and form the attempt history.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, ToSchema)]
pub struct ResultRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub quiz_id: Uuid,

    /// Name and email of the user at submission time.
    pub user_name: String,
    pub user_email: String,

    pub correct_answers: i32,
    pub wrong_answers: i32,
    pub unanswered: i32,
    pub total_questions: i32,

    /// Percentage with exactly two decimals, e.g. "70.00".
    pub score: String,

    /// Minutes spent on the attempt.
    pub time_taken: Option<i32>,

    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Insert payload for one attempt. `score` is already derived.
#[derive(Debug, Clone)]
pub struct NewResult {
    pub user_id: Uuid,
    pub quiz_id: Uuid,
    pub user_name: String,
    pub user_email: String,
    pub correct_answers: i32,
    pub wrong_answers: i32,
    pub unanswered: i32,
    pub total_questions: i32,
    pub score: String,
    pub time_taken: Option<i32>,
}

/// Full replacement of an attempt's counts, used by the update-by-id path.
#[derive(Debug, Clone)]
pub struct ResultChanges {
    pub correct_answers: i32,
    pub wrong_answers: i32,
    pub unanswered: i32,
    pub total_questions: i32,
    pub score: String,
    pub time_taken: Option<i32>,
}

/// DTO for submitting an attempt.
///
/// The counts are not required to add up to `total_questions`.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SubmitResultRequest {
    pub quiz_id: Uuid,
    #[validate(range(min = 0))]
    pub correct_answers: i32,
    #[validate(range(min = 0))]
    pub wrong_answers: i32,
    #[validate(range(min = 0))]
    pub unanswered: i32,
    #[validate(range(min = 0))]
    pub total_questions: i32,
    #[validate(range(min = 0))]
    pub time_taken: Option<i32>,
}

/// DTO for updating an attempt. Omitted counts keep their stored value.
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateResultRequest {
    #[validate(range(min = 0))]
    pub correct_answers: Option<i32>,
    #[validate(range(min = 0))]
    pub wrong_answers: Option<i32>,
    #[validate(range(min = 0))]
    pub unanswered: Option<i32>,
    #[validate(range(min = 0))]
    pub total_questions: Option<i32>,
    #[validate(range(min = 0))]
    pub time_taken: Option<i32>,
}

/// Latest attempt of one user on one quiz plus how many attempts exist.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct AttemptSummary {
    #[serde(flatten)]
    pub latest: ResultRecord,
    pub attempts: usize,
}

/// `GET /api/results/{quiz_id}` response body.
#[derive(Debug, Serialize, ToSchema)]
pub struct QuizResults {
    pub quiz_title: String,
    pub results: Vec<AttemptSummary>,
}

/// `GET /api/results/user/{user_id}` response body.
#[derive(Debug, Serialize, ToSchema)]
pub struct UserResults {
    pub user_id: Uuid,
    /// Quiz id -> latest attempt on that quiz.
    #[schema(value_type = Object)]
    pub latest: BTreeMap<Uuid, ResultRecord>,
    /// Every attempt, newest first.
    pub history: Vec<ResultRecord>,
}
