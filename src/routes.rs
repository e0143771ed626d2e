// src/routes.rs

use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method, header},
    middleware,
    routing::{delete, get, post, put},
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    config::MAX_UPLOAD_BYTES,
    docs::ApiDoc,
    handlers::{auth, health, leaderboard, participant, question, quiz, result},
    state::AppState,
    utils::jwt::auth_middleware,
};

/// Assembles the main application router.
///
/// * Public reads and registration/login are open.
/// * Writes go through `auth_middleware`, which injects `Claims`.
/// * Uploaded images are served from `config.upload_dir` under `/uploads`.
pub fn create_router(state: AppState) -> Router {
    let origins: Vec<HeaderValue> = state
        .config
        .allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    let auth = middleware::from_fn_with_state(state.clone(), auth_middleware);

    let health_routes = Router::new()
        .route("/liveness", get(health::liveness))
        .route("/readiness", get(health::readiness));

    let user_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/creator/{creator_id}", get(quiz::list_creator_quizzes))
        .route("/quizzes", post(quiz::create_quiz).route_layer(auth.clone()));

    let quiz_routes = Router::new()
        .route("/", get(quiz::list_quizzes))
        .route("/categories", get(quiz::list_categories))
        .route("/categories-by-id", get(quiz::list_categories_by_id))
        .route("/category/{category}", get(quiz::list_by_category))
        .route(
            "/{id}",
            get(quiz::get_quiz).merge(
                put(quiz::update_quiz)
                    .delete(quiz::delete_quiz)
                    .route_layer(auth.clone()),
            ),
        );

    let question_routes = Router::new()
        .route(
            "/",
            get(question::list_questions).merge(post(question::create_question).route_layer(auth.clone())),
        )
        .route("/quiz/{quiz_id}", get(question::list_quiz_questions))
        .route(
            "/{id}",
            get(question::get_question).merge(
                put(question::update_question)
                    .delete(question::delete_question)
                    .route_layer(auth.clone()),
            ),
        );

    let participant_routes = Router::new()
        .route("/join", post(participant::join_quiz).route_layer(auth.clone()))
        .route("/check", post(participant::check_joined).route_layer(auth.clone()))
        .route("/{quiz_id}", get(participant::list_participants))
        .route("/{quiz_id}/participants", get(participant::list_participants))
        .route("/{quiz_id}/score", put(participant::submit_score).route_layer(auth.clone()));

    // `{id}` is a quiz id for GET and a result id for PUT/DELETE.
    let result_routes = Router::new()
        .route("/", get(result::list_results))
        .route("/submit", post(result::submit_result).route_layer(auth.clone()))
        .route("/user/{user_id}", get(result::user_results))
        .route("/user/{user_id}/quiz/{quiz_id}", get(result::latest_attempt))
        .route(
            "/{id}",
            get(result::quiz_results).merge(
                put(result::update_result)
                    .delete(result::delete_result)
                    .route_layer(auth.clone()),
            ),
        );

    let leaderboard_routes = Router::new()
        .route(
            "/",
            get(leaderboard::get_leaderboard).merge(post(leaderboard::create_entry).route_layer(auth.clone())),
        )
        .route(
            "/{id}",
            put(leaderboard::update_entry)
                .merge(delete(leaderboard::delete_entry))
                .route_layer(auth),
        );

    let uploads = ServeDir::new(&state.config.upload_dir);

    Router::new()
        .nest("/api/health", health_routes)
        .nest("/api/users", user_routes)
        .nest("/api/quizzes", quiz_routes)
        .nest("/api/questions", question_routes)
        .nest("/api/participants", participant_routes)
        .nest("/api/results", result_routes)
        .nest("/api/leaderboard", leaderboard_routes)
        .nest_service("/uploads", uploads)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Global Middleware (applied from outside in)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors)
                .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .with_state(state)
}
