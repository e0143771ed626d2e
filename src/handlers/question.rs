// src/handlers/question.rs

use std::collections::BTreeMap;

use axum::{
    Extension, Json,
    body::Bytes,
    extract::{Multipart, Path, State, multipart::MultipartRejection},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use serde_json::json;
use validator::Validate;

use super::parse_id;
use crate::{
    config::Config,
    error::AppError,
    models::question::{CreateQuestionRequest, QuestionView, UpdateQuestionRequest},
    services::authoring,
    store::DynStore,
    utils::{
        jwt::Claims,
        upload::{base_url, discard_image, save_image},
    },
};

struct ImageUpload {
    file_name: Option<String>,
    content_type: Option<String>,
    bytes: Bytes,
}

/// Raw multipart fields of a question create/update request.
/// Blank text fields count as absent.
#[derive(Default)]
struct QuestionForm {
    quiz_id: Option<String>,
    prompt: Option<String>,
    number: Option<String>,
    options: Option<String>,
    correct_answer: Option<String>,
    image: Option<ImageUpload>,
}

impl QuestionForm {
    async fn read(mut multipart: Multipart) -> Result<Self, AppError> {
        let mut form = QuestionForm::default();

        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or_default().to_string();

            if name == "image" {
                let file_name = field.file_name().map(str::to_string);
                let content_type = field.content_type().map(str::to_string);
                let bytes = field.bytes().await?;
                if !bytes.is_empty() {
                    form.image = Some(ImageUpload {
                        file_name,
                        content_type,
                        bytes,
                    });
                }
                continue;
            }

            let value = field.text().await?;
            let value = Some(value.trim().to_string()).filter(|v| !v.is_empty());
            match name.as_str() {
                "quiz_id" => form.quiz_id = value,
                "prompt" => form.prompt = value,
                "number" => form.number = value,
                "options" => form.options = value,
                "correct_answer" => form.correct_answer = value,
                other => tracing::debug!("Ignoring multipart field '{}'", other),
            }
        }

        Ok(form)
    }

    fn number(&self) -> Result<Option<i32>, AppError> {
        self.number
            .as_deref()
            .map(|n| n.parse::<i32>().map_err(|_| AppError::BadRequest("number must be an integer".to_string())))
            .transpose()
    }

    fn options(&self) -> Result<Option<BTreeMap<String, String>>, AppError> {
        match self.options.as_deref() {
            Some(raw) => Ok(Some(serde_json::from_str(raw).map_err(|e| {
                AppError::BadRequest(format!("options must be a JSON object of label to text: {}", e))
            })?)),
            None => Ok(None),
        }
    }

    fn into_create(self) -> Result<(CreateQuestionRequest, Option<ImageUpload>), AppError> {
        let quiz_id = self
            .quiz_id
            .as_deref()
            .ok_or_else(|| AppError::BadRequest("quiz_id is required".to_string()))
            .and_then(|raw| parse_id(raw, "quiz"))?;
        let number = self.number()?;
        let options = self
            .options()?
            .ok_or_else(|| AppError::BadRequest("options is required".to_string()))?;

        let req = CreateQuestionRequest {
            quiz_id,
            prompt: self
                .prompt
                .ok_or_else(|| AppError::BadRequest("prompt is required".to_string()))?,
            number,
            options,
            correct_answer: self
                .correct_answer
                .ok_or_else(|| AppError::BadRequest("correct_answer is required".to_string()))?,
        };
        req.validate()?;

        Ok((req, self.image))
    }

    fn into_update(self) -> Result<(UpdateQuestionRequest, Option<ImageUpload>), AppError> {
        let req = UpdateQuestionRequest {
            number: self.number()?,
            options: self.options()?,
            prompt: self.prompt,
            correct_answer: self.correct_answer,
        };
        req.validate()?;

        Ok((req, self.image))
    }
}

async fn store_image(config: &Config, image: Option<ImageUpload>) -> Result<Option<String>, AppError> {
    match image {
        Some(image) => save_image(
            &config.upload_dir,
            image.file_name.as_deref(),
            image.content_type.as_deref(),
            &image.bytes,
        )
        .await
        .map(Some),
        None => Ok(None),
    }
}

#[utoipa::path(
    get,
    path = "/api/questions",
    tag = "Questions",
    responses((status = 200, description = "All questions", body = [QuestionView]))
)]
pub async fn list_questions(
    State(store): State<DynStore>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AppError> {
    let base = base_url(&headers);
    let questions: Vec<QuestionView> = store
        .list_questions()
        .await?
        .into_iter()
        .map(|q| q.into_view(base.as_ref()))
        .collect();

    Ok(Json(questions))
}

/// Questions of one quiz ordered by their number.
#[utoipa::path(
    get,
    path = "/api/questions/quiz/{quiz_id}",
    tag = "Questions",
    params(("quiz_id" = String, Path, description = "Quiz id")),
    responses((status = 200, description = "Questions of the quiz", body = [QuestionView]))
)]
pub async fn list_quiz_questions(
    State(store): State<DynStore>,
    Path(quiz_id): Path<String>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AppError> {
    let quiz_id = parse_id(&quiz_id, "quiz")?;
    let base = base_url(&headers);

    let questions: Vec<QuestionView> = store
        .list_questions_by_quizzes(&[quiz_id])
        .await?
        .into_iter()
        .map(|q| q.into_view(base.as_ref()))
        .collect();

    Ok(Json(questions))
}

#[utoipa::path(
    get,
    path = "/api/questions/{id}",
    tag = "Questions",
    params(("id" = String, Path, description = "Question id")),
    responses(
        (status = 200, description = "The question", body = QuestionView),
        (status = 404, description = "Question not found")
    )
)]
pub async fn get_question(
    State(store): State<DynStore>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id, "question")?;

    let question = store
        .find_question(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Question not found".to_string()))?;

    Ok(Json(question.into_view(base_url(&headers).as_ref())))
}

/// Adds a question from a multipart form.
///
/// Fields: `quiz_id`, `prompt`, `number` (optional), `options` (JSON
/// object string), `correct_answer`, and an optional `image` file.
#[utoipa::path(
    post,
    path = "/api/questions",
    tag = "Questions",
    responses(
        (status = 201, description = "Question created"),
        (status = 400, description = "Invalid form"),
        (status = 403, description = "Not the quiz creator")
    ),
    security(("jwt" = []))
)]
pub async fn create_question(
    State(store): State<DynStore>,
    State(config): State<Config>,
    Extension(claims): Extension<Claims>,
    headers: HeaderMap,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id()?;
    let (req, image) = QuestionForm::read(multipart?).await?.into_create()?;
    let image_url = store_image(&config, image).await?;

    let question = match authoring::add_question(store.as_ref(), user_id, req, image_url.clone()).await {
        Ok(question) => question,
        Err(e) => {
            if let Some(path) = image_url {
                discard_image(&config.upload_dir, &path).await;
            }
            return Err(e);
        }
    };

    tracing::info!("Question {} added to quiz {}", question.id, question.quiz_id);

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Question created successfully",
            "question": question.into_view(base_url(&headers).as_ref()),
        })),
    ))
}

/// Partially updates a question from a multipart form. A new `image`
/// replaces the stored reference.
#[utoipa::path(
    put,
    path = "/api/questions/{id}",
    tag = "Questions",
    params(("id" = String, Path, description = "Question id")),
    responses(
        (status = 200, description = "Updated question", body = QuestionView),
        (status = 400, description = "Invalid form"),
        (status = 403, description = "Not the quiz creator"),
        (status = 404, description = "Question not found")
    ),
    security(("jwt" = []))
)]
pub async fn update_question(
    State(store): State<DynStore>,
    State(config): State<Config>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
    headers: HeaderMap,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id, "question")?;
    let user_id = claims.user_id()?;
    let (req, image) = QuestionForm::read(multipart?).await?.into_update()?;
    let image_url = store_image(&config, image).await?;

    let question = match authoring::update_question(store.as_ref(), user_id, id, req, image_url.clone()).await {
        Ok(question) => question,
        Err(e) => {
            if let Some(path) = image_url {
                discard_image(&config.upload_dir, &path).await;
            }
            return Err(e);
        }
    };

    Ok(Json(question.into_view(base_url(&headers).as_ref())))
}

#[utoipa::path(
    delete,
    path = "/api/questions/{id}",
    tag = "Questions",
    params(("id" = String, Path, description = "Question id")),
    responses(
        (status = 200, description = "Question deleted"),
        (status = 403, description = "Not the quiz creator"),
        (status = 404, description = "Question not found")
    ),
    security(("jwt" = []))
)]
pub async fn delete_question(
    State(store): State<DynStore>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id, "question")?;
    authoring::delete_question(store.as_ref(), claims.user_id()?, id).await?;

    Ok(Json(json!({ "message": "Question deleted successfully" })))
}
