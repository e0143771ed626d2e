// src/models/quiz.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::models::question::QuestionView;

/// Publication state of a quiz.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "quiz_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum QuizStatus {
    #[default]
    Draft,
    Published,
}

/// Represents the 'quizzes' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, ToSchema)]
pub struct Quiz {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,

    /// Owning user. Deleting the user deletes the quiz.
    pub creator_id: Uuid,

    /// Time limit in minutes.
    pub timer: Option<i32>,

    /// Free-text category.
    pub category: Option<String>,

    pub status: Option<QuizStatus>,

    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// A quiz together with its numbered questions.
#[derive(Debug, Serialize, ToSchema)]
pub struct QuizWithQuestions {
    #[serde(flatten)]
    pub quiz: Quiz,
    pub questions: Vec<QuestionView>,
}

/// Insert payload for a new quiz.
#[derive(Debug, Clone)]
pub struct NewQuiz {
    pub creator_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub timer: Option<i32>,
    pub category: Option<String>,
    pub status: QuizStatus,
}

/// DTO for creating a new quiz.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateQuizRequest {
    #[validate(length(min = 1, max = 200, message = "Title length must be between 1 and 200 chars"))]
    pub title: String,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    #[validate(range(min = 1, max = 600, message = "Timer must be between 1 and 600 minutes"))]
    pub timer: Option<i32>,
    #[validate(length(min = 1, max = 100))]
    pub category: Option<String>,
    pub status: Option<QuizStatus>,
}

/// DTO for updating a quiz. Fields are optional.
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateQuizRequest {
    #[validate(length(min = 1, max = 200, message = "Title length must be between 1 and 200 chars"))]
    pub title: Option<String>,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    #[validate(range(min = 1, max = 600, message = "Timer must be between 1 and 600 minutes"))]
    pub timer: Option<i32>,
    #[validate(length(min = 1, max = 100))]
    pub category: Option<String>,
    pub status: Option<QuizStatus>,
}

impl UpdateQuizRequest {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.timer.is_none()
            && self.category.is_none()
            && self.status.is_none()
    }
}

/// `{categories: [...]}` response body.
#[derive(Debug, Serialize, ToSchema)]
pub struct CategoriesResponse {
    pub categories: Vec<String>,
}

/// Category of one quiz, as returned by the lookup by quiz ids.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, ToSchema)]
pub struct QuizCategory {
    pub id: Uuid,
    pub category: String,
}

/// `{categories: [{id, category}]}` response body.
#[derive(Debug, Serialize, ToSchema)]
pub struct QuizCategoriesResponse {
    pub categories: Vec<QuizCategory>,
}

/// Query string of `GET /api/quizzes/categories-by-id`.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CategoriesByIdParams {
    /// Comma separated quiz ids.
    pub quiz_ids: Option<String>,
}

impl CategoriesByIdParams {
    /// Blank entries are skipped; any other entry must be a UUID.
    pub fn ids(&self) -> Result<Vec<Uuid>, String> {
        self.quiz_ids
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|raw| !raw.is_empty())
            .map(|raw| Uuid::parse_str(raw).map_err(|_| format!("Invalid quiz ID '{}'", raw)))
            .collect()
    }
}
