// src/store/mod.rs

//! Persistence seam.
//!
//! Domain operations and handlers only see these traits. `PgStore` is the
//! production implementation; the application state holds it behind an
//! `Arc<dyn Store>` created at startup and closed on shutdown.

pub mod postgres;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{
    leaderboard::{CreateLeaderboardRequest, LeaderboardEntry, LeaderboardRow, UpdateLeaderboardRequest},
    participant::{NewParticipant, Participant},
    question::{NewQuestion, Question, QuestionChanges},
    quiz::{NewQuiz, Quiz, QuizCategory, UpdateQuizRequest},
    result::{NewResult, ResultChanges, ResultRecord},
    user::{NewUser, User},
};

pub use postgres::PgStore;

pub type StoreResult<T> = std::result::Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("{0}")]
    UniqueViolation(String),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Fails with `UniqueViolation` when the email is taken.
    async fn insert_user(&self, user: NewUser) -> StoreResult<User>;
    async fn find_user(&self, id: Uuid) -> StoreResult<Option<User>>;
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;
    /// Flips `participant` to `creator`. Returns whether a row changed.
    async fn promote_to_creator(&self, id: Uuid) -> StoreResult<bool>;
}

#[async_trait]
pub trait QuizStore: Send + Sync {
    async fn insert_quiz(&self, quiz: NewQuiz) -> StoreResult<Quiz>;
    async fn find_quiz(&self, id: Uuid) -> StoreResult<Option<Quiz>>;
    async fn list_quizzes(&self) -> StoreResult<Vec<Quiz>>;
    async fn list_quizzes_by_creator(&self, creator_id: Uuid) -> StoreResult<Vec<Quiz>>;
    async fn list_quizzes_by_category(&self, category: &str) -> StoreResult<Vec<Quiz>>;
    /// Distinct, non-null categories in ascending order.
    async fn list_categories(&self) -> StoreResult<Vec<String>>;
    /// `(id, category)` of the given quizzes that have a category.
    async fn categories_for_quizzes(&self, quiz_ids: &[Uuid]) -> StoreResult<Vec<QuizCategory>>;
    async fn update_quiz(&self, id: Uuid, changes: &UpdateQuizRequest) -> StoreResult<Option<Quiz>>;
    /// Deletes the quiz and, through cascades, everything referencing it.
    async fn delete_quiz(&self, id: Uuid) -> StoreResult<Option<Quiz>>;
}

#[async_trait]
pub trait QuestionStore: Send + Sync {
    async fn insert_question(&self, question: NewQuestion) -> StoreResult<Question>;
    async fn find_question(&self, id: Uuid) -> StoreResult<Option<Question>>;
    async fn list_questions(&self) -> StoreResult<Vec<Question>>;
    /// Ordered by `number`, then creation time.
    async fn list_questions_by_quizzes(&self, quiz_ids: &[Uuid]) -> StoreResult<Vec<Question>>;
    async fn count_questions(&self, quiz_id: Uuid) -> StoreResult<i64>;
    async fn update_question(&self, id: Uuid, changes: &QuestionChanges) -> StoreResult<Option<Question>>;
    async fn delete_question(&self, id: Uuid) -> StoreResult<bool>;
}

#[async_trait]
pub trait ParticipantStore: Send + Sync {
    /// Inserts the join row unless one already exists for (user, quiz).
    /// Returns `None` when the pair was already present. Atomic.
    async fn insert_participant_if_absent(&self, participant: NewParticipant) -> StoreResult<Option<Participant>>;
    async fn participant_exists(&self, user_id: Uuid, quiz_id: Uuid) -> StoreResult<bool>;
    async fn list_participants(&self, quiz_id: Uuid) -> StoreResult<Vec<Participant>>;
    async fn set_participant_score(&self, user_id: Uuid, quiz_id: Uuid, score: i32) -> StoreResult<Option<Participant>>;
}

#[async_trait]
pub trait ResultStore: Send + Sync {
    async fn insert_result(&self, result: NewResult) -> StoreResult<ResultRecord>;
    async fn find_result(&self, id: Uuid) -> StoreResult<Option<ResultRecord>>;
    async fn list_results(&self) -> StoreResult<Vec<ResultRecord>>;
    async fn results_for_user(&self, user_id: Uuid) -> StoreResult<Vec<ResultRecord>>;
    async fn results_for_quiz(&self, quiz_id: Uuid) -> StoreResult<Vec<ResultRecord>>;
    async fn results_for_user_and_quiz(&self, user_id: Uuid, quiz_id: Uuid) -> StoreResult<Vec<ResultRecord>>;
    async fn update_result(&self, id: Uuid, changes: &ResultChanges) -> StoreResult<Option<ResultRecord>>;
    async fn delete_result(&self, id: Uuid) -> StoreResult<Option<ResultRecord>>;
}

#[async_trait]
pub trait LeaderboardStore: Send + Sync {
    async fn insert_entry(&self, entry: &CreateLeaderboardRequest) -> StoreResult<LeaderboardEntry>;
    async fn find_entry(&self, id: Uuid) -> StoreResult<Option<LeaderboardEntry>>;
    /// Entries of one quiz joined with user and quiz names, score descending.
    async fn leaderboard_for_quiz(&self, quiz_id: Uuid) -> StoreResult<Vec<LeaderboardRow>>;
    async fn update_entry(&self, id: Uuid, changes: &UpdateLeaderboardRequest) -> StoreResult<Option<LeaderboardEntry>>;
    async fn delete_entry(&self, id: Uuid) -> StoreResult<Option<LeaderboardEntry>>;
}

#[async_trait]
pub trait Store:
    UserStore + QuizStore + QuestionStore + ParticipantStore + ResultStore + LeaderboardStore + Send + Sync
{
    /// Round trip used by the readiness probe.
    async fn ping(&self) -> StoreResult<()>;
    /// Releases the underlying connections.
    async fn close(&self);
}

pub type DynStore = Arc<dyn Store>;
