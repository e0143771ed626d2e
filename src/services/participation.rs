// src/services/participation.rs

use uuid::Uuid;

use crate::{
    error::AppError,
    models::participant::{NewParticipant, Participant, QuizParticipants},
    store::Store,
};

/// Registers `user_id` as a participant of `quiz_id`.
///
/// The user's current name and email are copied into the row. A second
/// join for the same pair is rejected and leaves the existing row alone.
pub async fn join(store: &dyn Store, user_id: Uuid, quiz_id: Uuid) -> Result<Participant, AppError> {
    if store.find_quiz(quiz_id).await?.is_none() {
        return Err(AppError::NotFound("Quiz not found".to_string()));
    }

    let user = store
        .find_user(user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    let inserted = store
        .insert_participant_if_absent(NewParticipant {
            user_id: user.id,
            quiz_id,
            name: user.name,
            email: user.email,
        })
        .await?;

    match inserted {
        Some(participant) => {
            tracing::info!("User {} joined quiz {}", user_id, quiz_id);
            Ok(participant)
        }
        None => Err(AppError::Conflict("User already joined this quiz".to_string())),
    }
}

/// Whether `user_id` has joined `quiz_id`. Read only.
pub async fn check_joined(store: &dyn Store, user_id: Uuid, quiz_id: Uuid) -> Result<bool, AppError> {
    Ok(store.participant_exists(user_id, quiz_id).await?)
}

pub async fn participants_for_quiz(store: &dyn Store, quiz_id: Uuid) -> Result<QuizParticipants, AppError> {
    let quiz = store
        .find_quiz(quiz_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Quiz not found".to_string()))?;

    let participants = store.list_participants(quiz_id).await?;

    Ok(QuizParticipants {
        quiz_title: quiz.title,
        participants,
    })
}

/// Sets the participant's own score field. Result submissions never touch it.
pub async fn submit_participant_score(
    store: &dyn Store,
    user_id: Uuid,
    quiz_id: Uuid,
    score: i32,
) -> Result<Participant, AppError> {
    store
        .set_participant_score(user_id, quiz_id, score)
        .await?
        .ok_or_else(|| AppError::NotFound("Participant not found for this quiz".to_string()))
}
