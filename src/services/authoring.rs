// src/services/authoring.rs

//! Quiz and question authoring, including the participant -> creator
//! promotion that happens on a user's first quiz.

use uuid::Uuid;

use crate::{
    error::AppError,
    models::{
        question::{CreateQuestionRequest, NewQuestion, Question, QuestionChanges, UpdateQuestionRequest, ensure_answer_key},
        quiz::{CreateQuizRequest, NewQuiz, Quiz, UpdateQuizRequest},
        user::Role,
    },
    store::Store,
    utils::html::{clean_optional, clean_options, clean_required},
};

/// Creates a quiz owned by `creator_id`.
///
/// After the insert, a participant is promoted to creator. The promotion
/// is not part of the insert: if it fails the quiz stays and the failure
/// is only logged.
pub async fn create_quiz(store: &dyn Store, creator_id: Uuid, req: CreateQuizRequest) -> Result<Quiz, AppError> {
    let creator = store
        .find_user(creator_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    let quiz = store
        .insert_quiz(NewQuiz {
            creator_id,
            title: req.title.trim().to_string(),
            description: clean_optional(req.description),
            timer: req.timer,
            category: req.category.map(|c| c.trim().to_string()),
            status: req.status.unwrap_or_default(),
        })
        .await?;

    tracing::info!("Quiz {} created by {}", quiz.id, creator_id);

    match creator.role {
        Role::Participant => match store.promote_to_creator(creator_id).await {
            Ok(true) => tracing::info!("User {} promoted to creator", creator_id),
            Ok(false) => tracing::debug!("User {} was already promoted", creator_id),
            Err(e) => tracing::warn!("Failed to promote user {} to creator: {:?}", creator_id, e),
        },
        Role::Creator => {}
    }

    Ok(quiz)
}

/// Loads the quiz and checks that `user_id` created it.
pub async fn ensure_quiz_owner(store: &dyn Store, user_id: Uuid, quiz_id: Uuid) -> Result<Quiz, AppError> {
    let quiz = store
        .find_quiz(quiz_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Quiz not found".to_string()))?;

    if quiz.creator_id != user_id {
        return Err(AppError::Forbidden("Only the quiz creator can modify this quiz".to_string()));
    }

    Ok(quiz)
}

pub async fn update_quiz(
    store: &dyn Store,
    user_id: Uuid,
    quiz_id: Uuid,
    mut changes: UpdateQuizRequest,
) -> Result<Quiz, AppError> {
    if changes.is_empty() {
        return Err(AppError::BadRequest("No fields to update".to_string()));
    }

    ensure_quiz_owner(store, user_id, quiz_id).await?;

    changes.title = changes.title.map(|t| t.trim().to_string());
    changes.description = clean_optional(changes.description);

    store
        .update_quiz(quiz_id, &changes)
        .await?
        .ok_or_else(|| AppError::NotFound("Quiz not found".to_string()))
}

/// Deletes the quiz; questions, participants, results and leaderboard
/// rows go with it.
pub async fn delete_quiz(store: &dyn Store, user_id: Uuid, quiz_id: Uuid) -> Result<Quiz, AppError> {
    ensure_quiz_owner(store, user_id, quiz_id).await?;

    let deleted = store
        .delete_quiz(quiz_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Quiz not found".to_string()))?;

    tracing::info!("Quiz {} deleted by {}", quiz_id, user_id);
    Ok(deleted)
}

/// Adds a question to a quiz the user owns. Without an explicit number
/// the question is appended after the existing ones.
pub async fn add_question(
    store: &dyn Store,
    user_id: Uuid,
    req: CreateQuestionRequest,
    image_url: Option<String>,
) -> Result<Question, AppError> {
    ensure_answer_key(&req.options, &req.correct_answer)?;
    ensure_quiz_owner(store, user_id, req.quiz_id).await?;

    let prompt = clean_required(&req.prompt, "Question prompt")?;
    let options = clean_options(req.options)?;

    let number = match req.number {
        Some(number) => number,
        None => store.count_questions(req.quiz_id).await? as i32 + 1,
    };

    let question = store
        .insert_question(NewQuestion {
            quiz_id: req.quiz_id,
            prompt,
            number,
            options,
            correct_answer: req.correct_answer,
            image_url,
        })
        .await?;

    Ok(question)
}

/// Updates a question of a quiz the user owns. A new image replaces the
/// stored reference.
pub async fn update_question(
    store: &dyn Store,
    user_id: Uuid,
    id: Uuid,
    req: UpdateQuestionRequest,
    image_url: Option<String>,
) -> Result<Question, AppError> {
    let existing = store
        .find_question(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Question not found".to_string()))?;

    ensure_quiz_owner(store, user_id, existing.quiz_id).await?;

    if req.options.is_some() || req.correct_answer.is_some() {
        let options = req.options.as_ref().unwrap_or(&existing.options.0);
        let answer = req.correct_answer.as_deref().unwrap_or(&existing.correct_answer);
        ensure_answer_key(options, answer)?;
    }

    let changes = QuestionChanges {
        prompt: req
            .prompt
            .as_deref()
            .map(|prompt| clean_required(prompt, "Question prompt"))
            .transpose()?,
        number: req.number,
        options: req.options.map(clean_options).transpose()?,
        correct_answer: req.correct_answer,
        image_url,
    };

    if changes.is_empty() {
        return Err(AppError::BadRequest("No fields to update".to_string()));
    }

    store
        .update_question(id, &changes)
        .await?
        .ok_or_else(|| AppError::NotFound("Question not found".to_string()))
}

pub async fn delete_question(store: &dyn Store, user_id: Uuid, id: Uuid) -> Result<(), AppError> {
    let existing = store
        .find_question(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Question not found".to_string()))?;

    ensure_quiz_owner(store, user_id, existing.quiz_id).await?;

    if !store.delete_question(id).await? {
        return Err(AppError::NotFound("Question not found".to_string()));
    }

    Ok(())
}
