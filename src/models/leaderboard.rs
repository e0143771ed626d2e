// src/models/leaderboard.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

/// Represents the 'leaderboard' table.
/// Rows are written explicitly and are not derived from results.
#[derive(Debug, Clone, FromRow, Serialize, ToSchema)]
pub struct LeaderboardEntry {
    pub id: Uuid,
    pub quiz_id: Uuid,
    pub user_id: Uuid,
    pub score: i32,
    pub rank: Option<i32>,
}

/// Leaderboard row joined with `users` and `quizzes` for display.
#[derive(Debug, Clone, FromRow, Serialize, ToSchema)]
pub struct LeaderboardRow {
    pub id: Uuid,
    pub quiz_id: Uuid,
    pub user_id: Uuid,
    pub score: i32,
    pub rank: Option<i32>,
    pub user_name: String,
    pub quiz_name: String,
}

/// DTO for creating a leaderboard entry.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateLeaderboardRequest {
    pub quiz_id: Uuid,
    pub user_id: Uuid,
    #[validate(range(min = 0))]
    pub score: i32,
    #[validate(range(min = 1))]
    pub rank: Option<i32>,
}

/// DTO for updating a leaderboard entry. Fields are optional.
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateLeaderboardRequest {
    pub quiz_id: Option<Uuid>,
    pub user_id: Option<Uuid>,
    #[validate(range(min = 0))]
    pub score: Option<i32>,
    #[validate(range(min = 1))]
    pub rank: Option<i32>,
}

impl UpdateLeaderboardRequest {
    pub fn is_empty(&self) -> bool {
        self.quiz_id.is_none() && self.user_id.is_none() && self.score.is_none() && self.rank.is_none()
    }
}

/// Query parameters for reading a leaderboard.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LeaderboardParams {
    /// Quiz to read; required, must be a UUID.
    pub quiz_id: Option<String>,
}
