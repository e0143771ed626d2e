// src/models/question.rs

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use sqlx::{prelude::FromRow, types::Json};
use url::Url;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::error::AppError;

/// Represents the 'questions' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, ToSchema)]
pub struct Question {
    pub id: Uuid,

    /// Owning quiz. Questions are deleted with their quiz.
    pub quiz_id: Uuid,

    /// The prompt shown to the participant.
    pub prompt: String,

    /// Ordinal position inside the quiz, starting at 1.
    pub number: i32,

    /// Choice label -> choice text (e.g. {"A": "Ownership", "B": "Borrowing"}).
    /// Stored as a JSON object in the database.
    #[schema(value_type = Object)]
    pub options: Json<BTreeMap<String, String>>,

    /// Label of the correct choice.
    pub correct_answer: String,

    /// Relative upload path (e.g. "/uploads/1700000000000-diagram.png").
    pub image_url: Option<String>,

    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Question as rendered inside a quiz, with the image reference made absolute.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct QuestionView {
    pub id: Uuid,
    pub quiz_id: Uuid,
    pub number: i32,
    pub prompt: String,
    pub options: BTreeMap<String, String>,
    pub correct_answer: String,
    pub image_url: Option<String>,
}

impl Question {
    /// Builds the read view. Relative image paths are joined onto `base`
    /// when one is known; otherwise they are passed through unchanged.
    pub fn into_view(self, base: Option<&Url>) -> QuestionView {
        let image_url = self.image_url.map(|path| match base.and_then(|b| b.join(&path).ok()) {
            Some(absolute) => absolute.to_string(),
            None => path,
        });

        QuestionView {
            id: self.id,
            quiz_id: self.quiz_id,
            number: self.number,
            prompt: self.prompt,
            options: self.options.0,
            correct_answer: self.correct_answer,
            image_url,
        }
    }
}

/// Insert payload for a new question.
#[derive(Debug, Clone)]
pub struct NewQuestion {
    pub quiz_id: Uuid,
    pub prompt: String,
    pub number: i32,
    pub options: BTreeMap<String, String>,
    pub correct_answer: String,
    pub image_url: Option<String>,
}

/// Column changes for a question update. `None` leaves the column as is.
#[derive(Debug, Clone, Default)]
pub struct QuestionChanges {
    pub prompt: Option<String>,
    pub number: Option<i32>,
    pub options: Option<BTreeMap<String, String>>,
    pub correct_answer: Option<String>,
    pub image_url: Option<String>,
}

impl QuestionChanges {
    pub fn is_empty(&self) -> bool {
        self.prompt.is_none()
            && self.number.is_none()
            && self.options.is_none()
            && self.correct_answer.is_none()
            && self.image_url.is_none()
    }
}

/// DTO for creating a new question (decoded from multipart form fields).
#[derive(Debug, Deserialize, Validate)]
pub struct CreateQuestionRequest {
    pub quiz_id: Uuid,
    #[validate(length(min = 1, max = 1000))]
    pub prompt: String,
    #[validate(range(min = 1))]
    pub number: Option<i32>,
    #[validate(custom(function = validate_options))]
    pub options: BTreeMap<String, String>,
    #[validate(length(min = 1, max = 10))]
    pub correct_answer: String,
}

/// DTO for updating a question. Fields are optional.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateQuestionRequest {
    #[validate(length(min = 1, max = 1000))]
    pub prompt: Option<String>,
    #[validate(range(min = 1))]
    pub number: Option<i32>,
    #[validate(custom(function = validate_options))]
    pub options: Option<BTreeMap<String, String>>,
    #[validate(length(min = 1, max = 10))]
    pub correct_answer: Option<String>,
}

fn validate_options(options: &BTreeMap<String, String>) -> Result<(), validator::ValidationError> {
    if options.is_empty() {
        return Err(validator::ValidationError::new("options_cannot_be_empty"));
    }
    for (label, text) in options {
        if label.trim().is_empty() || label.len() > 10 {
            return Err(validator::ValidationError::new("invalid_option_label"));
        }
        if text.len() > 500 {
            return Err(validator::ValidationError::new("option_too_long"));
        }
    }
    Ok(())
}

/// The correct answer must name one of the option labels.
pub fn ensure_answer_key(
    options: &BTreeMap<String, String>,
    correct_answer: &str,
) -> Result<(), AppError> {
    if options.contains_key(correct_answer) {
        Ok(())
    } else {
        Err(AppError::BadRequest(format!(
            "correct_answer '{}' is not one of the option labels",
            correct_answer
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options() -> BTreeMap<String, String> {
        BTreeMap::from([
            ("A".to_string(), "x".to_string()),
            ("B".to_string(), "y".to_string()),
        ])
    }

    fn question(image_url: Option<&str>) -> Question {
        Question {
            id: Uuid::new_v4(),
            quiz_id: Uuid::new_v4(),
            prompt: "Pick x".to_string(),
            number: 1,
            options: Json(options()),
            correct_answer: "A".to_string(),
            image_url: image_url.map(str::to_string),
            created_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn test_image_url_is_made_absolute() {
        let base = Url::parse("http://localhost:5000").unwrap();
        let view = question(Some("/uploads/1-a.png")).into_view(Some(&base));
        assert_eq!(view.image_url.as_deref(), Some("http://localhost:5000/uploads/1-a.png"));
    }

    #[test]
    fn test_image_url_without_base_is_untouched() {
        let view = question(Some("/uploads/1-a.png")).into_view(None);
        assert_eq!(view.image_url.as_deref(), Some("/uploads/1-a.png"));
        assert!(question(None).into_view(None).image_url.is_none());
    }

    #[test]
    fn test_answer_key_must_exist() {
        assert!(ensure_answer_key(&options(), "A").is_ok());
        assert!(ensure_answer_key(&options(), "C").is_err());
    }

    #[test]
    fn test_empty_options_are_rejected() {
        let req = CreateQuestionRequest {
            quiz_id: Uuid::new_v4(),
            prompt: "Pick one".to_string(),
            number: None,
            options: BTreeMap::new(),
            correct_answer: "A".to_string(),
        };
        assert!(req.validate().is_err());
    }
}
