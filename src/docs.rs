// src/docs.rs

use utoipa::{
    Modify, OpenApi,
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
};

use crate::{
    handlers::{auth, health, leaderboard, participant, question, quiz, result},
    models::{
        leaderboard::{CreateLeaderboardRequest, LeaderboardEntry, LeaderboardRow, UpdateLeaderboardRequest},
        participant::{Participant, ParticipantScoreRequest, QuizParticipants, QuizRef},
        question::{Question, QuestionView},
        quiz::{
            CategoriesResponse, CreateQuizRequest, Quiz, QuizCategoriesResponse, QuizCategory, QuizStatus,
            QuizWithQuestions, UpdateQuizRequest,
        },
        result::{AttemptSummary, QuizResults, ResultRecord, SubmitResultRequest, UpdateResultRequest, UserResults},
        user::{LoginRequest, RegisterRequest, Role, User},
    },
};

#[derive(OpenApi)]
#[openapi(
    paths(
        health::liveness,
        health::readiness,
        auth::register,
        auth::login,
        quiz::create_quiz,
        quiz::list_creator_quizzes,
        quiz::list_quizzes,
        quiz::list_categories,
        quiz::list_categories_by_id,
        quiz::list_by_category,
        quiz::get_quiz,
        quiz::update_quiz,
        quiz::delete_quiz,
        question::list_questions,
        question::list_quiz_questions,
        question::get_question,
        question::create_question,
        question::update_question,
        question::delete_question,
        participant::join_quiz,
        participant::check_joined,
        participant::submit_score,
        participant::list_participants,
        result::submit_result,
        result::list_results,
        result::user_results,
        result::latest_attempt,
        result::quiz_results,
        result::update_result,
        result::delete_result,
        leaderboard::get_leaderboard,
        leaderboard::create_entry,
        leaderboard::update_entry,
        leaderboard::delete_entry,
    ),
    components(
        schemas(
            User, Role, RegisterRequest, LoginRequest,
            Quiz, QuizStatus, QuizWithQuestions, CreateQuizRequest, UpdateQuizRequest, CategoriesResponse,
            QuizCategory, QuizCategoriesResponse,
            Question, QuestionView,
            Participant, QuizRef, ParticipantScoreRequest, QuizParticipants,
            ResultRecord, SubmitResultRequest, UpdateResultRequest, AttemptSummary, QuizResults, UserResults,
            LeaderboardEntry, LeaderboardRow, CreateLeaderboardRequest, UpdateLeaderboardRequest,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "System", description = "Health probes"),
        (name = "Users", description = "Registration and login"),
        (name = "Quizzes", description = "Quiz authoring and browsing"),
        (name = "Questions", description = "Questions of a quiz"),
        (name = "Participants", description = "Joining quizzes"),
        (name = "Results", description = "Attempts and latest standings"),
        (name = "Leaderboard", description = "Explicitly written rankings")
    )
)]
pub struct ApiDoc;

/// Registers the bearer scheme referenced as `jwt` by protected paths.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "jwt",
                SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).bearer_format("JWT").build()),
            );
        }
    }
}
