// src/models/participant.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Represents the 'participants' table: "user X has joined quiz Y".
/// At most one row exists per (user_id, quiz_id).
#[derive(Debug, Clone, FromRow, Serialize, ToSchema)]
pub struct Participant {
    pub id: Uuid,
    pub user_id: Uuid,
    pub quiz_id: Uuid,

    /// Name and email as they were when the user joined.
    pub name: String,
    pub email: String,

    /// Set only through the participant score endpoint, never by result submission.
    pub score: Option<i32>,

    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Insert payload for a join.
#[derive(Debug, Clone)]
pub struct NewParticipant {
    pub user_id: Uuid,
    pub quiz_id: Uuid,
    pub name: String,
    pub email: String,
}

/// DTO for `join` and `check`; the user comes from the token.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct QuizRef {
    pub quiz_id: Uuid,
}

/// DTO for the participant score endpoint.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ParticipantScoreRequest {
    #[validate(range(min = 0, message = "Score must not be negative"))]
    pub score: i32,
}

/// `{quiz_title, participants}` response body.
#[derive(Debug, Serialize, ToSchema)]
pub struct QuizParticipants {
    pub quiz_title: String,
    pub participants: Vec<Participant>,
}
