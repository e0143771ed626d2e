// src/store/postgres.rs

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder, types::Json};
use uuid::Uuid;

use super::{
    LeaderboardStore, ParticipantStore, QuestionStore, QuizStore, ResultStore, Store, StoreError,
    StoreResult, UserStore,
};
use crate::models::{
    leaderboard::{CreateLeaderboardRequest, LeaderboardEntry, LeaderboardRow, UpdateLeaderboardRequest},
    participant::{NewParticipant, Participant},
    question::{NewQuestion, Question, QuestionChanges},
    quiz::{NewQuiz, Quiz, QuizCategory, UpdateQuizRequest},
    result::{NewResult, ResultChanges, ResultRecord},
    user::{NewUser, User},
};

const USER_COLUMNS: &str = "id, email, password, username, name, role, created_at";
const QUIZ_COLUMNS: &str = "id, title, description, creator_id, timer, category, status, created_at";
const QUESTION_COLUMNS: &str =
    "id, quiz_id, prompt, number, options, correct_answer, image_url, created_at";
const PARTICIPANT_COLUMNS: &str = "id, user_id, quiz_id, name, email, score, created_at";
// NUMERIC(14,2) is read back as text so the two decimals survive as written.
const RESULT_COLUMNS: &str = "id, user_id, quiz_id, user_name, user_email, correct_answers, \
    wrong_answers, unanswered, total_questions, score::TEXT AS score, time_taken, created_at";
const LEADERBOARD_COLUMNS: &str = "id, quiz_id, user_id, score, rank";

/// PostgreSQL-backed store.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Maps a unique-constraint violation to `UniqueViolation(message)`.
fn unique_or(err: sqlx::Error, message: &str) -> StoreError {
    let unique = err
        .as_database_error()
        .is_some_and(|db| db.is_unique_violation());
    if unique {
        StoreError::UniqueViolation(message.to_string())
    } else {
        StoreError::Database(err)
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn insert_user(&self, user: NewUser) -> StoreResult<User> {
        let sql = format!(
            "INSERT INTO users (email, password, username, name) VALUES ($1, $2, $3, $4) RETURNING {}",
            USER_COLUMNS
        );
        sqlx::query_as::<_, User>(&sql)
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(&user.username)
            .bind(&user.name)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| unique_or(e, "Email is already registered"))
    }

    async fn find_user(&self, id: Uuid) -> StoreResult<Option<User>> {
        let sql = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
        Ok(sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let sql = format!("SELECT {} FROM users WHERE email = $1", USER_COLUMNS);
        Ok(sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn promote_to_creator(&self, id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query(
            "UPDATE users SET role = 'creator' WHERE id = $1 AND role = 'participant'",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }
}

#[async_trait]
impl QuizStore for PgStore {
    async fn insert_quiz(&self, quiz: NewQuiz) -> StoreResult<Quiz> {
        let sql = format!(
            r#"
            INSERT INTO quizzes (creator_id, title, description, timer, category, status)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {}
            "#,
            QUIZ_COLUMNS
        );
        Ok(sqlx::query_as::<_, Quiz>(&sql)
            .bind(quiz.creator_id)
            .bind(&quiz.title)
            .bind(&quiz.description)
            .bind(quiz.timer)
            .bind(&quiz.category)
            .bind(quiz.status)
            .fetch_one(&self.pool)
            .await?)
    }

    async fn find_quiz(&self, id: Uuid) -> StoreResult<Option<Quiz>> {
        let sql = format!("SELECT {} FROM quizzes WHERE id = $1", QUIZ_COLUMNS);
        Ok(sqlx::query_as::<_, Quiz>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn list_quizzes(&self) -> StoreResult<Vec<Quiz>> {
        let sql = format!("SELECT {} FROM quizzes ORDER BY created_at DESC", QUIZ_COLUMNS);
        Ok(sqlx::query_as::<_, Quiz>(&sql).fetch_all(&self.pool).await?)
    }

    async fn list_quizzes_by_creator(&self, creator_id: Uuid) -> StoreResult<Vec<Quiz>> {
        let sql = format!(
            "SELECT {} FROM quizzes WHERE creator_id = $1 ORDER BY created_at DESC",
            QUIZ_COLUMNS
        );
        Ok(sqlx::query_as::<_, Quiz>(&sql)
            .bind(creator_id)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn list_quizzes_by_category(&self, category: &str) -> StoreResult<Vec<Quiz>> {
        let sql = format!(
            "SELECT {} FROM quizzes WHERE category = $1 ORDER BY created_at DESC",
            QUIZ_COLUMNS
        );
        Ok(sqlx::query_as::<_, Quiz>(&sql)
            .bind(category)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn list_categories(&self) -> StoreResult<Vec<String>> {
        Ok(sqlx::query_scalar::<_, String>(
            "SELECT DISTINCT category FROM quizzes WHERE category IS NOT NULL ORDER BY category",
        )
        .fetch_all(&self.pool)
        .await?)
    }

    async fn categories_for_quizzes(&self, quiz_ids: &[Uuid]) -> StoreResult<Vec<QuizCategory>> {
        Ok(sqlx::query_as::<_, QuizCategory>(
            r#"
            SELECT id, category FROM quizzes
            WHERE id = ANY($1) AND category IS NOT NULL
            ORDER BY created_at
            "#,
        )
        .bind(quiz_ids)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn update_quiz(&self, id: Uuid, changes: &UpdateQuizRequest) -> StoreResult<Option<Quiz>> {
        if changes.is_empty() {
            return self.find_quiz(id).await;
        }

        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new("UPDATE quizzes SET ");
        let mut separated = builder.separated(", ");

        if let Some(title) = &changes.title {
            separated.push("title = ");
            separated.push_bind_unseparated(title.clone());
        }

        if let Some(description) = &changes.description {
            separated.push("description = ");
            separated.push_bind_unseparated(description.clone());
        }

        if let Some(timer) = changes.timer {
            separated.push("timer = ");
            separated.push_bind_unseparated(timer);
        }

        if let Some(category) = &changes.category {
            separated.push("category = ");
            separated.push_bind_unseparated(category.clone());
        }

        if let Some(status) = changes.status {
            separated.push("status = ");
            separated.push_bind_unseparated(status);
        }

        builder.push(" WHERE id = ");
        builder.push_bind(id);
        builder.push(" RETURNING ");
        builder.push(QUIZ_COLUMNS);

        Ok(builder
            .build_query_as::<Quiz>()
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn delete_quiz(&self, id: Uuid) -> StoreResult<Option<Quiz>> {
        let sql = format!("DELETE FROM quizzes WHERE id = $1 RETURNING {}", QUIZ_COLUMNS);
        Ok(sqlx::query_as::<_, Quiz>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }
}

#[async_trait]
impl QuestionStore for PgStore {
    async fn insert_question(&self, question: NewQuestion) -> StoreResult<Question> {
        let sql = format!(
            r#"
            INSERT INTO questions (quiz_id, prompt, number, options, correct_answer, image_url)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {}
            "#,
            QUESTION_COLUMNS
        );
        Ok(sqlx::query_as::<_, Question>(&sql)
            .bind(question.quiz_id)
            .bind(&question.prompt)
            .bind(question.number)
            .bind(Json(&question.options))
            .bind(&question.correct_answer)
            .bind(&question.image_url)
            .fetch_one(&self.pool)
            .await?)
    }

    async fn find_question(&self, id: Uuid) -> StoreResult<Option<Question>> {
        let sql = format!("SELECT {} FROM questions WHERE id = $1", QUESTION_COLUMNS);
        Ok(sqlx::query_as::<_, Question>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn list_questions(&self) -> StoreResult<Vec<Question>> {
        let sql = format!(
            "SELECT {} FROM questions ORDER BY quiz_id, number, created_at",
            QUESTION_COLUMNS
        );
        Ok(sqlx::query_as::<_, Question>(&sql).fetch_all(&self.pool).await?)
    }

    async fn list_questions_by_quizzes(&self, quiz_ids: &[Uuid]) -> StoreResult<Vec<Question>> {
        if quiz_ids.is_empty() {
            return Ok(Vec::new());
        }

        let sql = format!(
            "SELECT {} FROM questions WHERE quiz_id = ANY($1) ORDER BY number, created_at",
            QUESTION_COLUMNS
        );
        Ok(sqlx::query_as::<_, Question>(&sql)
            .bind(quiz_ids)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn count_questions(&self, quiz_id: Uuid) -> StoreResult<i64> {
        Ok(sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM questions WHERE quiz_id = $1")
            .bind(quiz_id)
            .fetch_one(&self.pool)
            .await?)
    }

    async fn update_question(&self, id: Uuid, changes: &QuestionChanges) -> StoreResult<Option<Question>> {
        if changes.is_empty() {
            return self.find_question(id).await;
        }

        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new("UPDATE questions SET ");
        let mut separated = builder.separated(", ");

        if let Some(prompt) = &changes.prompt {
            separated.push("prompt = ");
            separated.push_bind_unseparated(prompt.clone());
        }

        if let Some(number) = changes.number {
            separated.push("number = ");
            separated.push_bind_unseparated(number);
        }

        if let Some(options) = &changes.options {
            separated.push("options = ");
            separated.push_bind_unseparated(Json(options.clone()));
        }

        if let Some(correct_answer) = &changes.correct_answer {
            separated.push("correct_answer = ");
            separated.push_bind_unseparated(correct_answer.clone());
        }

        if let Some(image_url) = &changes.image_url {
            separated.push("image_url = ");
            separated.push_bind_unseparated(image_url.clone());
        }

        builder.push(" WHERE id = ");
        builder.push_bind(id);
        builder.push(" RETURNING ");
        builder.push(QUESTION_COLUMNS);

        Ok(builder
            .build_query_as::<Question>()
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn delete_question(&self, id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM questions WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl ParticipantStore for PgStore {
    async fn insert_participant_if_absent(&self, participant: NewParticipant) -> StoreResult<Option<Participant>> {
        let sql = format!(
            r#"
            INSERT INTO participants (user_id, quiz_id, name, email)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (user_id, quiz_id) DO NOTHING
            RETURNING {}
            "#,
            PARTICIPANT_COLUMNS
        );
        Ok(sqlx::query_as::<_, Participant>(&sql)
            .bind(participant.user_id)
            .bind(participant.quiz_id)
            .bind(&participant.name)
            .bind(&participant.email)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn participant_exists(&self, user_id: Uuid, quiz_id: Uuid) -> StoreResult<bool> {
        Ok(sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM participants WHERE user_id = $1 AND quiz_id = $2)",
        )
        .bind(user_id)
        .bind(quiz_id)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn list_participants(&self, quiz_id: Uuid) -> StoreResult<Vec<Participant>> {
        let sql = format!(
            "SELECT {} FROM participants WHERE quiz_id = $1 ORDER BY created_at",
            PARTICIPANT_COLUMNS
        );
        Ok(sqlx::query_as::<_, Participant>(&sql)
            .bind(quiz_id)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn set_participant_score(&self, user_id: Uuid, quiz_id: Uuid, score: i32) -> StoreResult<Option<Participant>> {
        let sql = format!(
            "UPDATE participants SET score = $3 WHERE user_id = $1 AND quiz_id = $2 RETURNING {}",
            PARTICIPANT_COLUMNS
        );
        Ok(sqlx::query_as::<_, Participant>(&sql)
            .bind(user_id)
            .bind(quiz_id)
            .bind(score)
            .fetch_optional(&self.pool)
            .await?)
    }
}

#[async_trait]
impl ResultStore for PgStore {
    async fn insert_result(&self, result: NewResult) -> StoreResult<ResultRecord> {
        let sql = format!(
            r#"
            INSERT INTO results
            (user_id, quiz_id, user_name, user_email, correct_answers, wrong_answers,
             unanswered, total_questions, score, time_taken)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9::NUMERIC, $10)
            RETURNING {}
            "#,
            RESULT_COLUMNS
        );
        Ok(sqlx::query_as::<_, ResultRecord>(&sql)
            .bind(result.user_id)
            .bind(result.quiz_id)
            .bind(&result.user_name)
            .bind(&result.user_email)
            .bind(result.correct_answers)
            .bind(result.wrong_answers)
            .bind(result.unanswered)
            .bind(result.total_questions)
            .bind(&result.score)
            .bind(result.time_taken)
            .fetch_one(&self.pool)
            .await?)
    }

    async fn find_result(&self, id: Uuid) -> StoreResult<Option<ResultRecord>> {
        let sql = format!("SELECT {} FROM results WHERE id = $1", RESULT_COLUMNS);
        Ok(sqlx::query_as::<_, ResultRecord>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn list_results(&self) -> StoreResult<Vec<ResultRecord>> {
        let sql = format!(
            "SELECT {} FROM results ORDER BY created_at DESC, id DESC",
            RESULT_COLUMNS
        );
        Ok(sqlx::query_as::<_, ResultRecord>(&sql).fetch_all(&self.pool).await?)
    }

    async fn results_for_user(&self, user_id: Uuid) -> StoreResult<Vec<ResultRecord>> {
        let sql = format!(
            "SELECT {} FROM results WHERE user_id = $1 ORDER BY created_at DESC, id DESC",
            RESULT_COLUMNS
        );
        Ok(sqlx::query_as::<_, ResultRecord>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn results_for_quiz(&self, quiz_id: Uuid) -> StoreResult<Vec<ResultRecord>> {
        let sql = format!(
            "SELECT {} FROM results WHERE quiz_id = $1 ORDER BY created_at DESC, id DESC",
            RESULT_COLUMNS
        );
        Ok(sqlx::query_as::<_, ResultRecord>(&sql)
            .bind(quiz_id)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn results_for_user_and_quiz(&self, user_id: Uuid, quiz_id: Uuid) -> StoreResult<Vec<ResultRecord>> {
        let sql = format!(
            "SELECT {} FROM results WHERE user_id = $1 AND quiz_id = $2 ORDER BY created_at DESC, id DESC",
            RESULT_COLUMNS
        );
        Ok(sqlx::query_as::<_, ResultRecord>(&sql)
            .bind(user_id)
            .bind(quiz_id)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn update_result(&self, id: Uuid, changes: &ResultChanges) -> StoreResult<Option<ResultRecord>> {
        let sql = format!(
            r#"
            UPDATE results SET
                correct_answers = $2, wrong_answers = $3, unanswered = $4,
                total_questions = $5, score = $6::NUMERIC, time_taken = $7
            WHERE id = $1
            RETURNING {}
            "#,
            RESULT_COLUMNS
        );
        Ok(sqlx::query_as::<_, ResultRecord>(&sql)
            .bind(id)
            .bind(changes.correct_answers)
            .bind(changes.wrong_answers)
            .bind(changes.unanswered)
            .bind(changes.total_questions)
            .bind(&changes.score)
            .bind(changes.time_taken)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn delete_result(&self, id: Uuid) -> StoreResult<Option<ResultRecord>> {
        let sql = format!("DELETE FROM results WHERE id = $1 RETURNING {}", RESULT_COLUMNS);
        Ok(sqlx::query_as::<_, ResultRecord>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }
}

#[async_trait]
impl LeaderboardStore for PgStore {
    async fn insert_entry(&self, entry: &CreateLeaderboardRequest) -> StoreResult<LeaderboardEntry> {
        let sql = format!(
            "INSERT INTO leaderboard (quiz_id, user_id, score, rank) VALUES ($1, $2, $3, $4) RETURNING {}",
            LEADERBOARD_COLUMNS
        );
        Ok(sqlx::query_as::<_, LeaderboardEntry>(&sql)
            .bind(entry.quiz_id)
            .bind(entry.user_id)
            .bind(entry.score)
            .bind(entry.rank)
            .fetch_one(&self.pool)
            .await?)
    }

    async fn find_entry(&self, id: Uuid) -> StoreResult<Option<LeaderboardEntry>> {
        let sql = format!("SELECT {} FROM leaderboard WHERE id = $1", LEADERBOARD_COLUMNS);
        Ok(sqlx::query_as::<_, LeaderboardEntry>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn leaderboard_for_quiz(&self, quiz_id: Uuid) -> StoreResult<Vec<LeaderboardRow>> {
        Ok(sqlx::query_as::<_, LeaderboardRow>(
            r#"
            SELECT
                l.id, l.quiz_id, l.user_id, l.score, l.rank,
                u.name AS user_name,
                q.title AS quiz_name
            FROM leaderboard l
            JOIN users u ON l.user_id = u.id
            JOIN quizzes q ON l.quiz_id = q.id
            WHERE l.quiz_id = $1
            ORDER BY l.score DESC, l.rank ASC NULLS LAST
            "#,
        )
        .bind(quiz_id)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn update_entry(&self, id: Uuid, changes: &UpdateLeaderboardRequest) -> StoreResult<Option<LeaderboardEntry>> {
        if changes.is_empty() {
            return self.find_entry(id).await;
        }

        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new("UPDATE leaderboard SET ");
        let mut separated = builder.separated(", ");

        if let Some(quiz_id) = changes.quiz_id {
            separated.push("quiz_id = ");
            separated.push_bind_unseparated(quiz_id);
        }

        if let Some(user_id) = changes.user_id {
            separated.push("user_id = ");
            separated.push_bind_unseparated(user_id);
        }

        if let Some(score) = changes.score {
            separated.push("score = ");
            separated.push_bind_unseparated(score);
        }

        if let Some(rank) = changes.rank {
            separated.push("rank = ");
            separated.push_bind_unseparated(rank);
        }

        builder.push(" WHERE id = ");
        builder.push_bind(id);
        builder.push(" RETURNING ");
        builder.push(LEADERBOARD_COLUMNS);

        Ok(builder
            .build_query_as::<LeaderboardEntry>()
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn delete_entry(&self, id: Uuid) -> StoreResult<Option<LeaderboardEntry>> {
        let sql = format!("DELETE FROM leaderboard WHERE id = $1 RETURNING {}", LEADERBOARD_COLUMNS);
        Ok(sqlx::query_as::<_, LeaderboardEntry>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }
}

#[async_trait]
impl Store for PgStore {
    async fn ping(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}
