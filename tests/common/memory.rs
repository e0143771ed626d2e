// tests/common/memory.rs

//! In-memory `Store` used by the HTTP tests so they run without PostgreSQL.
//! Mirrors the orderings, uniqueness rules and cascades of the schema.

use std::sync::{
    Mutex, MutexGuard,
    atomic::{AtomicBool, Ordering},
};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use quiz_api::{
    models::{
        leaderboard::{CreateLeaderboardRequest, LeaderboardEntry, LeaderboardRow, UpdateLeaderboardRequest},
        participant::{NewParticipant, Participant},
        question::{NewQuestion, Question, QuestionChanges},
        quiz::{NewQuiz, Quiz, QuizCategory, UpdateQuizRequest},
        result::{NewResult, ResultChanges, ResultRecord},
        user::{NewUser, Role, User},
    },
    store::{
        LeaderboardStore, ParticipantStore, QuestionStore, QuizStore, ResultStore, Store, StoreError, StoreResult,
        UserStore,
    },
};
use sqlx::types::Json;
use uuid::Uuid;

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    quizzes: Vec<Quiz>,
    questions: Vec<Question>,
    participants: Vec<Participant>,
    results: Vec<ResultRecord>,
    leaderboard: Vec<LeaderboardEntry>,
    clock: Option<DateTime<Utc>>,
}

impl Tables {
    /// Strictly increasing timestamps, so insertion order is observable.
    fn now(&mut self) -> DateTime<Utc> {
        let now = Utc::now();
        let next = match self.clock {
            Some(last) if now <= last => last + Duration::microseconds(1),
            _ => now,
        };
        self.clock = Some(next);
        next
    }
}

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
    /// When set, `promote_to_creator` fails like a dropped connection.
    pub fail_promotion: AtomicBool,
}

impl MemoryStore {
    fn lock(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap()
    }

    pub fn participant_rows(&self, user_id: Uuid, quiz_id: Uuid) -> usize {
        self.lock()
            .participants
            .iter()
            .filter(|p| p.user_id == user_id && p.quiz_id == quiz_id)
            .count()
    }

    pub fn rows_for_quiz(&self, quiz_id: Uuid) -> (usize, usize, usize, usize) {
        let t = self.lock();
        (
            t.questions.iter().filter(|r| r.quiz_id == quiz_id).count(),
            t.participants.iter().filter(|r| r.quiz_id == quiz_id).count(),
            t.results.iter().filter(|r| r.quiz_id == quiz_id).count(),
            t.leaderboard.iter().filter(|r| r.quiz_id == quiz_id).count(),
        )
    }

    /// Renames a user in place, to check that snapshots do not follow.
    pub fn rename_user(&self, user_id: Uuid, name: &str) {
        if let Some(user) = self.lock().users.iter_mut().find(|u| u.id == user_id) {
            user.name = name.to_string();
        }
    }
}

fn newest_first(rows: &mut [ResultRecord]) {
    rows.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn insert_user(&self, user: NewUser) -> StoreResult<User> {
        let mut t = self.lock();
        if t.users.iter().any(|u| u.email == user.email) {
            return Err(StoreError::UniqueViolation("Email is already registered".to_string()));
        }
        let row = User {
            id: Uuid::new_v4(),
            email: user.email,
            password: user.password_hash,
            username: user.username,
            name: user.name,
            role: Role::Participant,
            created_at: t.now(),
        };
        t.users.push(row.clone());
        Ok(row)
    }

    async fn find_user(&self, id: Uuid) -> StoreResult<Option<User>> {
        Ok(self.lock().users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        Ok(self.lock().users.iter().find(|u| u.email == email).cloned())
    }

    async fn promote_to_creator(&self, id: Uuid) -> StoreResult<bool> {
        if self.fail_promotion.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("connection reset".to_string()));
        }
        let mut t = self.lock();
        match t.users.iter_mut().find(|u| u.id == id) {
            Some(user) if user.role == Role::Participant => {
                user.role = Role::Creator;
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

#[async_trait]
impl QuizStore for MemoryStore {
    async fn insert_quiz(&self, quiz: NewQuiz) -> StoreResult<Quiz> {
        let mut t = self.lock();
        let row = Quiz {
            id: Uuid::new_v4(),
            title: quiz.title,
            description: quiz.description,
            creator_id: quiz.creator_id,
            timer: quiz.timer,
            category: quiz.category,
            status: Some(quiz.status),
            created_at: t.now(),
        };
        t.quizzes.push(row.clone());
        Ok(row)
    }

    async fn find_quiz(&self, id: Uuid) -> StoreResult<Option<Quiz>> {
        Ok(self.lock().quizzes.iter().find(|q| q.id == id).cloned())
    }

    async fn list_quizzes(&self) -> StoreResult<Vec<Quiz>> {
        let mut rows = self.lock().quizzes.clone();
        rows.reverse();
        Ok(rows)
    }

    async fn list_quizzes_by_creator(&self, creator_id: Uuid) -> StoreResult<Vec<Quiz>> {
        let mut rows: Vec<Quiz> = self.lock().quizzes.iter().filter(|q| q.creator_id == creator_id).cloned().collect();
        rows.reverse();
        Ok(rows)
    }

    async fn list_quizzes_by_category(&self, category: &str) -> StoreResult<Vec<Quiz>> {
        let mut rows: Vec<Quiz> = self
            .lock()
            .quizzes
            .iter()
            .filter(|q| q.category.as_deref() == Some(category))
            .cloned()
            .collect();
        rows.reverse();
        Ok(rows)
    }

    async fn list_categories(&self) -> StoreResult<Vec<String>> {
        let mut categories: Vec<String> = self.lock().quizzes.iter().filter_map(|q| q.category.clone()).collect();
        categories.sort();
        categories.dedup();
        Ok(categories)
    }

    async fn categories_for_quizzes(&self, quiz_ids: &[Uuid]) -> StoreResult<Vec<QuizCategory>> {
        Ok(self
            .lock()
            .quizzes
            .iter()
            .filter(|q| quiz_ids.contains(&q.id))
            .filter_map(|q| {
                q.category.clone().map(|category| QuizCategory { id: q.id, category })
            })
            .collect())
    }

    async fn update_quiz(&self, id: Uuid, changes: &UpdateQuizRequest) -> StoreResult<Option<Quiz>> {
        let mut t = self.lock();
        let Some(quiz) = t.quizzes.iter_mut().find(|q| q.id == id) else {
            return Ok(None);
        };
        if let Some(title) = &changes.title {
            quiz.title = title.clone();
        }
        if let Some(description) = &changes.description {
            quiz.description = Some(description.clone());
        }
        if let Some(timer) = changes.timer {
            quiz.timer = Some(timer);
        }
        if let Some(category) = &changes.category {
            quiz.category = Some(category.clone());
        }
        if let Some(status) = changes.status {
            quiz.status = Some(status);
        }
        Ok(Some(quiz.clone()))
    }

    async fn delete_quiz(&self, id: Uuid) -> StoreResult<Option<Quiz>> {
        let mut t = self.lock();
        let Some(pos) = t.quizzes.iter().position(|q| q.id == id) else {
            return Ok(None);
        };
        let quiz = t.quizzes.remove(pos);
        t.questions.retain(|r| r.quiz_id != id);
        t.participants.retain(|r| r.quiz_id != id);
        t.results.retain(|r| r.quiz_id != id);
        t.leaderboard.retain(|r| r.quiz_id != id);
        Ok(Some(quiz))
    }
}

#[async_trait]
impl QuestionStore for MemoryStore {
    async fn insert_question(&self, question: NewQuestion) -> StoreResult<Question> {
        let mut t = self.lock();
        let row = Question {
            id: Uuid::new_v4(),
            quiz_id: question.quiz_id,
            prompt: question.prompt,
            number: question.number,
            options: Json(question.options),
            correct_answer: question.correct_answer,
            image_url: question.image_url,
            created_at: t.now(),
        };
        t.questions.push(row.clone());
        Ok(row)
    }

    async fn find_question(&self, id: Uuid) -> StoreResult<Option<Question>> {
        Ok(self.lock().questions.iter().find(|q| q.id == id).cloned())
    }

    async fn list_questions(&self) -> StoreResult<Vec<Question>> {
        let mut rows = self.lock().questions.clone();
        rows.sort_by(|a, b| (a.quiz_id, a.number, a.created_at).cmp(&(b.quiz_id, b.number, b.created_at)));
        Ok(rows)
    }

    async fn list_questions_by_quizzes(&self, quiz_ids: &[Uuid]) -> StoreResult<Vec<Question>> {
        let mut rows: Vec<Question> = self
            .lock()
            .questions
            .iter()
            .filter(|q| quiz_ids.contains(&q.quiz_id))
            .cloned()
            .collect();
        rows.sort_by(|a, b| (a.number, a.created_at).cmp(&(b.number, b.created_at)));
        Ok(rows)
    }

    async fn count_questions(&self, quiz_id: Uuid) -> StoreResult<i64> {
        Ok(self.lock().questions.iter().filter(|q| q.quiz_id == quiz_id).count() as i64)
    }

    async fn update_question(&self, id: Uuid, changes: &QuestionChanges) -> StoreResult<Option<Question>> {
        let mut t = self.lock();
        let Some(question) = t.questions.iter_mut().find(|q| q.id == id) else {
            return Ok(None);
        };
        if let Some(prompt) = &changes.prompt {
            question.prompt = prompt.clone();
        }
        if let Some(number) = changes.number {
            question.number = number;
        }
        if let Some(options) = &changes.options {
            question.options = Json(options.clone());
        }
        if let Some(answer) = &changes.correct_answer {
            question.correct_answer = answer.clone();
        }
        if let Some(image_url) = &changes.image_url {
            question.image_url = Some(image_url.clone());
        }
        Ok(Some(question.clone()))
    }

    async fn delete_question(&self, id: Uuid) -> StoreResult<bool> {
        let mut t = self.lock();
        let before = t.questions.len();
        t.questions.retain(|q| q.id != id);
        Ok(t.questions.len() != before)
    }
}

#[async_trait]
impl ParticipantStore for MemoryStore {
    async fn insert_participant_if_absent(&self, participant: NewParticipant) -> StoreResult<Option<Participant>> {
        let mut t = self.lock();
        if t
            .participants
            .iter()
            .any(|p| p.user_id == participant.user_id && p.quiz_id == participant.quiz_id)
        {
            return Ok(None);
        }
        let row = Participant {
            id: Uuid::new_v4(),
            user_id: participant.user_id,
            quiz_id: participant.quiz_id,
            name: participant.name,
            email: participant.email,
            score: None,
            created_at: t.now(),
        };
        t.participants.push(row.clone());
        Ok(Some(row))
    }

    async fn participant_exists(&self, user_id: Uuid, quiz_id: Uuid) -> StoreResult<bool> {
        Ok(self.participant_rows(user_id, quiz_id) > 0)
    }

    async fn list_participants(&self, quiz_id: Uuid) -> StoreResult<Vec<Participant>> {
        Ok(self.lock().participants.iter().filter(|p| p.quiz_id == quiz_id).cloned().collect())
    }

    async fn set_participant_score(&self, user_id: Uuid, quiz_id: Uuid, score: i32) -> StoreResult<Option<Participant>> {
        let mut t = self.lock();
        let row = t
            .participants
            .iter_mut()
            .find(|p| p.user_id == user_id && p.quiz_id == quiz_id);
        Ok(row.map(|p| {
            p.score = Some(score);
            p.clone()
        }))
    }
}

#[async_trait]
impl ResultStore for MemoryStore {
    async fn insert_result(&self, result: NewResult) -> StoreResult<ResultRecord> {
        let mut t = self.lock();
        let row = ResultRecord {
            id: Uuid::new_v4(),
            user_id: result.user_id,
            quiz_id: result.quiz_id,
            user_name: result.user_name,
            user_email: result.user_email,
            correct_answers: result.correct_answers,
            wrong_answers: result.wrong_answers,
            unanswered: result.unanswered,
            total_questions: result.total_questions,
            score: result.score,
            time_taken: result.time_taken,
            created_at: t.now(),
        };
        t.results.push(row.clone());
        Ok(row)
    }

    async fn find_result(&self, id: Uuid) -> StoreResult<Option<ResultRecord>> {
        Ok(self.lock().results.iter().find(|r| r.id == id).cloned())
    }

    async fn list_results(&self) -> StoreResult<Vec<ResultRecord>> {
        let mut rows = self.lock().results.clone();
        newest_first(&mut rows);
        Ok(rows)
    }

    async fn results_for_user(&self, user_id: Uuid) -> StoreResult<Vec<ResultRecord>> {
        let mut rows: Vec<ResultRecord> = self.lock().results.iter().filter(|r| r.user_id == user_id).cloned().collect();
        newest_first(&mut rows);
        Ok(rows)
    }

    async fn results_for_quiz(&self, quiz_id: Uuid) -> StoreResult<Vec<ResultRecord>> {
        let mut rows: Vec<ResultRecord> = self.lock().results.iter().filter(|r| r.quiz_id == quiz_id).cloned().collect();
        newest_first(&mut rows);
        Ok(rows)
    }

    async fn results_for_user_and_quiz(&self, user_id: Uuid, quiz_id: Uuid) -> StoreResult<Vec<ResultRecord>> {
        let mut rows: Vec<ResultRecord> = self
            .lock()
            .results
            .iter()
            .filter(|r| r.user_id == user_id && r.quiz_id == quiz_id)
            .cloned()
            .collect();
        newest_first(&mut rows);
        Ok(rows)
    }

    async fn update_result(&self, id: Uuid, changes: &ResultChanges) -> StoreResult<Option<ResultRecord>> {
        let mut t = self.lock();
        let Some(row) = t.results.iter_mut().find(|r| r.id == id) else {
            return Ok(None);
        };
        row.correct_answers = changes.correct_answers;
        row.wrong_answers = changes.wrong_answers;
        row.unanswered = changes.unanswered;
        row.total_questions = changes.total_questions;
        row.score = changes.score.clone();
        row.time_taken = changes.time_taken;
        Ok(Some(row.clone()))
    }

    async fn delete_result(&self, id: Uuid) -> StoreResult<Option<ResultRecord>> {
        let mut t = self.lock();
        let pos = t.results.iter().position(|r| r.id == id);
        Ok(pos.map(|pos| t.results.remove(pos)))
    }
}

#[async_trait]
impl LeaderboardStore for MemoryStore {
    async fn insert_entry(&self, entry: &CreateLeaderboardRequest) -> StoreResult<LeaderboardEntry> {
        let row = LeaderboardEntry {
            id: Uuid::new_v4(),
            quiz_id: entry.quiz_id,
            user_id: entry.user_id,
            score: entry.score,
            rank: entry.rank,
        };
        self.lock().leaderboard.push(row.clone());
        Ok(row)
    }

    async fn find_entry(&self, id: Uuid) -> StoreResult<Option<LeaderboardEntry>> {
        Ok(self.lock().leaderboard.iter().find(|e| e.id == id).cloned())
    }

    async fn leaderboard_for_quiz(&self, quiz_id: Uuid) -> StoreResult<Vec<LeaderboardRow>> {
        let t = self.lock();
        let mut rows: Vec<LeaderboardRow> = t
            .leaderboard
            .iter()
            .filter(|e| e.quiz_id == quiz_id)
            .filter_map(|e| {
                let user = t.users.iter().find(|u| u.id == e.user_id)?;
                let quiz = t.quizzes.iter().find(|q| q.id == e.quiz_id)?;
                Some(LeaderboardRow {
                    id: e.id,
                    quiz_id: e.quiz_id,
                    user_id: e.user_id,
                    score: e.score,
                    rank: e.rank,
                    user_name: user.name.clone(),
                    quiz_name: quiz.title.clone(),
                })
            })
            .collect();
        // score DESC, rank ASC NULLS LAST
        rows.sort_by(|a, b| {
            b.score
                .cmp(&a.score)
                .then_with(|| a.rank.unwrap_or(i32::MAX).cmp(&b.rank.unwrap_or(i32::MAX)))
        });
        Ok(rows)
    }

    async fn update_entry(&self, id: Uuid, changes: &UpdateLeaderboardRequest) -> StoreResult<Option<LeaderboardEntry>> {
        let mut t = self.lock();
        let Some(entry) = t.leaderboard.iter_mut().find(|e| e.id == id) else {
            return Ok(None);
        };
        if let Some(quiz_id) = changes.quiz_id {
            entry.quiz_id = quiz_id;
        }
        if let Some(user_id) = changes.user_id {
            entry.user_id = user_id;
        }
        if let Some(score) = changes.score {
            entry.score = score;
        }
        if let Some(rank) = changes.rank {
            entry.rank = Some(rank);
        }
        Ok(Some(entry.clone()))
    }

    async fn delete_entry(&self, id: Uuid) -> StoreResult<Option<LeaderboardEntry>> {
        let mut t = self.lock();
        let pos = t.leaderboard.iter().position(|e| e.id == id);
        Ok(pos.map(|pos| t.leaderboard.remove(pos)))
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }

    async fn close(&self) {}
}
