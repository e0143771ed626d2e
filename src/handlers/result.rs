// src/handlers/result.rs

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};

use super::parse_id;
use crate::{
    error::AppError,
    models::result::{QuizResults, ResultRecord, SubmitResultRequest, UpdateResultRequest, UserResults},
    services::{authoring, consolidation, scoring},
    store::DynStore,
    utils::{extract::ValidatedJson, jwt::Claims},
};

/// Records one attempt by the caller. The score is computed server side.
#[utoipa::path(
    post,
    path = "/api/results/submit",
    tag = "Results",
    request_body = SubmitResultRequest,
    responses(
        (status = 201, description = "Attempt stored", body = ResultRecord),
        (status = 404, description = "User or quiz not found")
    ),
    security(("jwt" = []))
)]
pub async fn submit_result(
    State(store): State<DynStore>,
    Extension(claims): Extension<Claims>,
    ValidatedJson(payload): ValidatedJson<SubmitResultRequest>,
) -> Result<impl IntoResponse, AppError> {
    let result = scoring::submit_result(store.as_ref(), claims.user_id()?, payload).await?;

    Ok((StatusCode::CREATED, Json(result)))
}

#[utoipa::path(
    get,
    path = "/api/results",
    tag = "Results",
    responses((status = 200, description = "Every attempt", body = [ResultRecord]))
)]
pub async fn list_results(State(store): State<DynStore>) -> Result<impl IntoResponse, AppError> {
    let results = store.list_results().await.map_err(|e| {
        tracing::error!("Failed to fetch results: {:?}", e);
        AppError::from(e)
    })?;

    Ok(Json(results))
}

/// Attempt history of a user and their latest attempt per quiz.
#[utoipa::path(
    get,
    path = "/api/results/user/{user_id}",
    tag = "Results",
    params(("user_id" = String, Path, description = "User id")),
    responses((status = 200, description = "Latest per quiz plus history", body = UserResults))
)]
pub async fn user_results(
    State(store): State<DynStore>,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = parse_id(&user_id, "user")?;
    Ok(Json(consolidation::user_results(store.as_ref(), user_id).await?))
}

#[utoipa::path(
    get,
    path = "/api/results/user/{user_id}/quiz/{quiz_id}",
    tag = "Results",
    params(
        ("user_id" = String, Path, description = "User id"),
        ("quiz_id" = String, Path, description = "Quiz id")
    ),
    responses(
        (status = 200, description = "Latest attempt", body = ResultRecord),
        (status = 404, description = "No attempt yet")
    )
)]
pub async fn latest_attempt(
    State(store): State<DynStore>,
    Path((user_id, quiz_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = parse_id(&user_id, "user")?;
    let quiz_id = parse_id(&quiz_id, "quiz")?;

    let latest = consolidation::latest_attempt(store.as_ref(), user_id, quiz_id)
        .await?
        .ok_or_else(|| AppError::NotFound("No results found for this user and quiz".to_string()))?;

    Ok(Json(latest))
}

/// Latest attempt of every user on a quiz with their attempt counts.
#[utoipa::path(
    get,
    path = "/api/results/{quiz_id}",
    tag = "Results",
    params(("quiz_id" = String, Path, description = "Quiz id")),
    responses(
        (status = 200, description = "One entry per user", body = QuizResults),
        (status = 404, description = "Quiz not found")
    )
)]
pub async fn quiz_results(
    State(store): State<DynStore>,
    Path(quiz_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let quiz_id = parse_id(&quiz_id, "quiz")?;
    Ok(Json(consolidation::quiz_results(store.as_ref(), quiz_id).await?))
}

/// Rewrites one of the caller's attempts; the score is recomputed.
#[utoipa::path(
    put,
    path = "/api/results/{id}",
    tag = "Results",
    params(("id" = String, Path, description = "Result id")),
    request_body = UpdateResultRequest,
    responses(
        (status = 200, description = "Updated attempt", body = ResultRecord),
        (status = 403, description = "Not the owner of the attempt"),
        (status = 404, description = "Result not found")
    ),
    security(("jwt" = []))
)]
pub async fn update_result(
    State(store): State<DynStore>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
    ValidatedJson(payload): ValidatedJson<UpdateResultRequest>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id, "result")?;
    let result = scoring::update_result(store.as_ref(), claims.user_id()?, id, payload).await?;

    Ok(Json(result))
}

/// Deletes an attempt. Only the creator of the attempt's quiz may do this.
#[utoipa::path(
    delete,
    path = "/api/results/{id}",
    tag = "Results",
    params(("id" = String, Path, description = "Result id")),
    responses(
        (status = 200, description = "Deleted attempt", body = ResultRecord),
        (status = 403, description = "Not the quiz creator"),
        (status = 404, description = "Result not found")
    ),
    security(("jwt" = []))
)]
pub async fn delete_result(
    State(store): State<DynStore>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id, "result")?;

    let existing = store
        .find_result(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Result not found".to_string()))?;
    authoring::ensure_quiz_owner(store.as_ref(), claims.user_id()?, existing.quiz_id).await?;

    let deleted = store
        .delete_result(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Result not found".to_string()))?;

    tracing::info!("Result {} deleted", deleted.id);
    Ok(Json(deleted))
}
