// src/handlers/quiz.rs

use std::collections::HashMap;

use axum::{
    Extension, Json,
    extract::{Path, Query, State, rejection::QueryRejection},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use serde_json::json;
use uuid::Uuid;

use super::parse_id;
use crate::{
    error::AppError,
    models::{
        question::Question,
        quiz::{
            CategoriesByIdParams, CategoriesResponse, CreateQuizRequest, Quiz, QuizCategoriesResponse, QuizWithQuestions,
            UpdateQuizRequest,
        },
    },
    services::authoring,
    store::{DynStore, Store},
    utils::{extract::ValidatedJson, jwt::Claims, upload::base_url},
};

/// Attaches each quiz's questions, in `number` order, with absolute image URLs.
async fn with_questions(
    store: &dyn Store,
    quizzes: Vec<Quiz>,
    headers: &HeaderMap,
) -> Result<Vec<QuizWithQuestions>, AppError> {
    let ids: Vec<Uuid> = quizzes.iter().map(|q| q.id).collect();
    let base = base_url(headers);

    let mut by_quiz: HashMap<Uuid, Vec<Question>> = HashMap::new();
    for question in store.list_questions_by_quizzes(&ids).await? {
        by_quiz.entry(question.quiz_id).or_default().push(question);
    }

    Ok(quizzes
        .into_iter()
        .map(|quiz| {
            let questions = by_quiz
                .remove(&quiz.id)
                .unwrap_or_default()
                .into_iter()
                .map(|q| q.into_view(base.as_ref()))
                .collect();
            QuizWithQuestions { quiz, questions }
        })
        .collect())
}

/// Creates a quiz owned by the caller.
///
/// A participant creating their first quiz becomes a creator.
#[utoipa::path(
    post,
    path = "/api/users/quizzes",
    tag = "Quizzes",
    request_body = CreateQuizRequest,
    responses(
        (status = 201, description = "Quiz created"),
        (status = 400, description = "Invalid input"),
        (status = 401, description = "Missing token")
    ),
    security(("jwt" = []))
)]
pub async fn create_quiz(
    State(store): State<DynStore>,
    Extension(claims): Extension<Claims>,
    ValidatedJson(payload): ValidatedJson<CreateQuizRequest>,
) -> Result<impl IntoResponse, AppError> {
    let quiz = authoring::create_quiz(store.as_ref(), claims.user_id()?, payload).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Quiz created successfully",
            "quiz": quiz,
        })),
    ))
}

/// Creator dashboard: every quiz of a creator with its questions.
#[utoipa::path(
    get,
    path = "/api/users/creator/{creator_id}",
    tag = "Quizzes",
    params(("creator_id" = String, Path, description = "Creator user id")),
    responses((status = 200, description = "Quizzes with nested questions", body = [QuizWithQuestions]))
)]
pub async fn list_creator_quizzes(
    State(store): State<DynStore>,
    Path(creator_id): Path<String>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AppError> {
    let creator_id = parse_id(&creator_id, "creator")?;
    let quizzes = store.list_quizzes_by_creator(creator_id).await?;

    Ok(Json(with_questions(store.as_ref(), quizzes, &headers).await?))
}

#[utoipa::path(
    get,
    path = "/api/quizzes",
    tag = "Quizzes",
    responses((status = 200, description = "All quizzes", body = [Quiz]))
)]
pub async fn list_quizzes(State(store): State<DynStore>) -> Result<impl IntoResponse, AppError> {
    let quizzes = store.list_quizzes().await.map_err(|e| {
        tracing::error!("Failed to fetch quizzes: {:?}", e);
        AppError::from(e)
    })?;

    Ok(Json(quizzes))
}

#[utoipa::path(
    get,
    path = "/api/quizzes/categories",
    tag = "Quizzes",
    responses((status = 200, description = "Distinct categories", body = CategoriesResponse))
)]
pub async fn list_categories(State(store): State<DynStore>) -> Result<impl IntoResponse, AppError> {
    let categories = store.list_categories().await?;
    Ok(Json(CategoriesResponse { categories }))
}

/// Categories of the given quizzes, skipping quizzes without one.
#[utoipa::path(
    get,
    path = "/api/quizzes/categories-by-id",
    tag = "Quizzes",
    params(CategoriesByIdParams),
    responses(
        (status = 200, description = "Category per quiz", body = QuizCategoriesResponse),
        (status = 400, description = "Missing or invalid quiz ids"),
        (status = 404, description = "No categories for these quizzes")
    )
)]
pub async fn list_categories_by_id(
    State(store): State<DynStore>,
    params: Result<Query<CategoriesByIdParams>, QueryRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Query(params) = params?;
    let ids = params.ids().map_err(AppError::BadRequest)?;

    if ids.is_empty() {
        return Err(AppError::BadRequest("Quiz IDs are required".to_string()));
    }

    let categories = store.categories_for_quizzes(&ids).await?;

    if categories.is_empty() {
        return Err(AppError::NotFound("No categories found for these quiz IDs".to_string()));
    }

    Ok(Json(QuizCategoriesResponse { categories }))
}

#[utoipa::path(
    get,
    path = "/api/quizzes/category/{category}",
    tag = "Quizzes",
    params(("category" = String, Path, description = "Category name")),
    responses(
        (status = 200, description = "`{quizzes}` in the category"),
        (status = 404, description = "No quizzes in this category")
    )
)]
pub async fn list_by_category(
    State(store): State<DynStore>,
    Path(category): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let quizzes = store.list_quizzes_by_category(category.trim()).await?;

    if quizzes.is_empty() {
        return Err(AppError::NotFound(format!("No quizzes found in category '{}'", category)));
    }

    Ok(Json(json!({ "quizzes": quizzes })))
}

/// Fetches one quiz with its numbered questions.
#[utoipa::path(
    get,
    path = "/api/quizzes/{id}",
    tag = "Quizzes",
    params(("id" = String, Path, description = "Quiz id")),
    responses(
        (status = 200, description = "Quiz with questions", body = QuizWithQuestions),
        (status = 400, description = "Invalid quiz ID"),
        (status = 404, description = "Quiz not found")
    )
)]
pub async fn get_quiz(
    State(store): State<DynStore>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id, "quiz")?;

    let quiz = store
        .find_quiz(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Quiz not found".to_string()))?;

    let mut quizzes = with_questions(store.as_ref(), vec![quiz], &headers).await?;
    let quiz = quizzes
        .pop()
        .ok_or_else(|| AppError::NotFound("Quiz not found".to_string()))?;

    Ok(Json(quiz))
}

#[utoipa::path(
    put,
    path = "/api/quizzes/{id}",
    tag = "Quizzes",
    params(("id" = String, Path, description = "Quiz id")),
    request_body = UpdateQuizRequest,
    responses(
        (status = 200, description = "Updated quiz", body = Quiz),
        (status = 403, description = "Not the quiz creator"),
        (status = 404, description = "Quiz not found")
    ),
    security(("jwt" = []))
)]
pub async fn update_quiz(
    State(store): State<DynStore>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
    ValidatedJson(payload): ValidatedJson<UpdateQuizRequest>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id, "quiz")?;
    let quiz = authoring::update_quiz(store.as_ref(), claims.user_id()?, id, payload).await?;

    Ok(Json(quiz))
}

/// Deletes a quiz together with its questions, participants, results and
/// leaderboard rows.
#[utoipa::path(
    delete,
    path = "/api/quizzes/{id}",
    tag = "Quizzes",
    params(("id" = String, Path, description = "Quiz id")),
    responses(
        (status = 200, description = "Deleted quiz", body = Quiz),
        (status = 403, description = "Not the quiz creator"),
        (status = 404, description = "Quiz not found")
    ),
    security(("jwt" = []))
)]
pub async fn delete_quiz(
    State(store): State<DynStore>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id, "quiz")?;
    let quiz = authoring::delete_quiz(store.as_ref(), claims.user_id()?, id).await?;

    Ok(Json(quiz))
}
