// src/handlers/participant.rs

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::json;

use super::parse_id;
use crate::{
    error::AppError,
    models::participant::{Participant, ParticipantScoreRequest, QuizParticipants, QuizRef},
    services::participation,
    store::DynStore,
    utils::{extract::ValidatedJson, jwt::Claims},
};

/// Joins the caller to a quiz. A second join is rejected with 400.
#[utoipa::path(
    post,
    path = "/api/participants/join",
    tag = "Participants",
    request_body = QuizRef,
    responses(
        (status = 201, description = "Joined successfully"),
        (status = 400, description = "User already joined this quiz"),
        (status = 404, description = "Quiz or user not found")
    ),
    security(("jwt" = []))
)]
pub async fn join_quiz(
    State(store): State<DynStore>,
    Extension(claims): Extension<Claims>,
    ValidatedJson(payload): ValidatedJson<QuizRef>,
) -> Result<impl IntoResponse, AppError> {
    let participant = participation::join(store.as_ref(), claims.user_id()?, payload.quiz_id).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Joined successfully",
            "participant": participant,
        })),
    ))
}

#[utoipa::path(
    post,
    path = "/api/participants/check",
    tag = "Participants",
    request_body = QuizRef,
    responses((status = 200, description = "`{joined: bool}`")),
    security(("jwt" = []))
)]
pub async fn check_joined(
    State(store): State<DynStore>,
    Extension(claims): Extension<Claims>,
    ValidatedJson(payload): ValidatedJson<QuizRef>,
) -> Result<impl IntoResponse, AppError> {
    let joined = participation::check_joined(store.as_ref(), claims.user_id()?, payload.quiz_id).await?;

    Ok(Json(json!({ "joined": joined })))
}

/// Sets the caller's participant score on a quiz they joined.
#[utoipa::path(
    put,
    path = "/api/participants/{quiz_id}/score",
    tag = "Participants",
    params(("quiz_id" = String, Path, description = "Quiz id")),
    request_body = ParticipantScoreRequest,
    responses(
        (status = 200, description = "Updated participant", body = Participant),
        (status = 404, description = "User has not joined this quiz")
    ),
    security(("jwt" = []))
)]
pub async fn submit_score(
    State(store): State<DynStore>,
    Extension(claims): Extension<Claims>,
    Path(quiz_id): Path<String>,
    ValidatedJson(payload): ValidatedJson<ParticipantScoreRequest>,
) -> Result<impl IntoResponse, AppError> {
    let quiz_id = parse_id(&quiz_id, "quiz")?;
    let participant =
        participation::submit_participant_score(store.as_ref(), claims.user_id()?, quiz_id, payload.score).await?;

    Ok(Json(participant))
}

/// Participants of a quiz. Served on both `/{quiz_id}` and
/// `/{quiz_id}/participants`.
#[utoipa::path(
    get,
    path = "/api/participants/{quiz_id}",
    tag = "Participants",
    params(("quiz_id" = String, Path, description = "Quiz id")),
    responses(
        (status = 200, description = "Quiz title and participants", body = QuizParticipants),
        (status = 404, description = "Quiz not found")
    )
)]
pub async fn list_participants(
    State(store): State<DynStore>,
    Path(quiz_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let quiz_id = parse_id(&quiz_id, "quiz")?;
    let participants = participation::participants_for_quiz(store.as_ref(), quiz_id).await?;

    Ok(Json(participants))
}
