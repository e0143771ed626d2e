// src/handlers/leaderboard.rs

use axum::{
    Json,
    extract::{Path, Query, State, rejection::QueryRejection},
    http::StatusCode,
    response::IntoResponse,
};
use uuid::Uuid;

use super::parse_id;
use crate::{
    error::AppError,
    models::leaderboard::{
        CreateLeaderboardRequest, LeaderboardEntry, LeaderboardParams, LeaderboardRow, UpdateLeaderboardRequest,
    },
    store::{DynStore, Store},
    utils::extract::ValidatedJson,
};

/// Leaderboard rows are written explicitly, so both references are
/// checked up front instead of surfacing as foreign key failures.
async fn ensure_refs(store: &dyn Store, quiz_id: Option<Uuid>, user_id: Option<Uuid>) -> Result<(), AppError> {
    if let Some(quiz_id) = quiz_id {
        if store.find_quiz(quiz_id).await?.is_none() {
            return Err(AppError::NotFound("Quiz not found".to_string()));
        }
    }
    if let Some(user_id) = user_id {
        if store.find_user(user_id).await?.is_none() {
            return Err(AppError::NotFound("User not found".to_string()));
        }
    }
    Ok(())
}

/// Entries of one quiz, highest score first.
#[utoipa::path(
    get,
    path = "/api/leaderboard",
    tag = "Leaderboard",
    params(LeaderboardParams),
    responses(
        (status = 200, description = "Leaderboard rows", body = [LeaderboardRow]),
        (status = 400, description = "Missing or invalid quiz_id"),
        (status = 404, description = "No entries for this quiz")
    )
)]
pub async fn get_leaderboard(
    State(store): State<DynStore>,
    params: Result<Query<LeaderboardParams>, QueryRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Query(params) = params?;
    let raw = params
        .quiz_id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| AppError::BadRequest("quiz_id is required".to_string()))?;
    let quiz_id = parse_id(raw.trim(), "quiz")?;

    let rows = store.leaderboard_for_quiz(quiz_id).await.map_err(|e| {
        tracing::error!("Failed to fetch leaderboard: {:?}", e);
        AppError::from(e)
    })?;

    if rows.is_empty() {
        return Err(AppError::NotFound("No leaderboard entries found for this quiz".to_string()));
    }

    Ok(Json(rows))
}

#[utoipa::path(
    post,
    path = "/api/leaderboard",
    tag = "Leaderboard",
    request_body = CreateLeaderboardRequest,
    responses(
        (status = 201, description = "Entry created", body = LeaderboardEntry),
        (status = 404, description = "Quiz or user not found")
    ),
    security(("jwt" = []))
)]
pub async fn create_entry(
    State(store): State<DynStore>,
    ValidatedJson(payload): ValidatedJson<CreateLeaderboardRequest>,
) -> Result<impl IntoResponse, AppError> {
    ensure_refs(store.as_ref(), Some(payload.quiz_id), Some(payload.user_id)).await?;

    let entry = store.insert_entry(&payload).await?;

    Ok((StatusCode::CREATED, Json(entry)))
}

#[utoipa::path(
    put,
    path = "/api/leaderboard/{id}",
    tag = "Leaderboard",
    params(("id" = String, Path, description = "Leaderboard entry id")),
    request_body = UpdateLeaderboardRequest,
    responses(
        (status = 200, description = "Updated entry", body = LeaderboardEntry),
        (status = 404, description = "Entry, quiz or user not found")
    ),
    security(("jwt" = []))
)]
pub async fn update_entry(
    State(store): State<DynStore>,
    Path(id): Path<String>,
    ValidatedJson(payload): ValidatedJson<UpdateLeaderboardRequest>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id, "leaderboard entry")?;

    if payload.is_empty() {
        return Err(AppError::BadRequest("No fields to update".to_string()));
    }
    ensure_refs(store.as_ref(), payload.quiz_id, payload.user_id).await?;

    let entry = store
        .update_entry(id, &payload)
        .await?
        .ok_or_else(|| AppError::NotFound("Leaderboard entry not found".to_string()))?;

    Ok(Json(entry))
}

#[utoipa::path(
    delete,
    path = "/api/leaderboard/{id}",
    tag = "Leaderboard",
    params(("id" = String, Path, description = "Leaderboard entry id")),
    responses(
        (status = 200, description = "Deleted entry", body = LeaderboardEntry),
        (status = 404, description = "Entry not found")
    ),
    security(("jwt" = []))
)]
pub async fn delete_entry(
    State(store): State<DynStore>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id, "leaderboard entry")?;

    let entry = store
        .delete_entry(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Leaderboard entry not found".to_string()))?;

    Ok(Json(entry))
}
