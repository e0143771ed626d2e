// src/services/scoring.rs

use uuid::Uuid;

use crate::{
    error::AppError,
    models::result::{NewResult, ResultChanges, ResultRecord, SubmitResultRequest, UpdateResultRequest},
    store::Store,
};

/// Percentage of correct answers, rounded to two decimals and rendered
/// with exactly two fraction digits ("70.00").
///
/// A quiz with no questions scores "0.00".
pub fn compute_score(correct: i32, total: i32) -> String {
    if total <= 0 {
        return format!("{:.2}", 0.0);
    }

    let percentage = (correct as f64 / total as f64) * 100.0;
    let rounded = (percentage * 100.0).round() / 100.0;
    format!("{:.2}", rounded)
}

/// Records one attempt.
///
/// Always inserts a new row. The score is derived from the counts and the
/// acting user's current name and email are copied into the row.
pub async fn submit_result(
    store: &dyn Store,
    user_id: Uuid,
    submission: SubmitResultRequest,
) -> Result<ResultRecord, AppError> {
    let user = store
        .find_user(user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    if store.find_quiz(submission.quiz_id).await?.is_none() {
        return Err(AppError::NotFound("Quiz not found".to_string()));
    }

    let score = compute_score(submission.correct_answers, submission.total_questions);

    let result = store
        .insert_result(NewResult {
            user_id: user.id,
            quiz_id: submission.quiz_id,
            user_name: user.name,
            user_email: user.email,
            correct_answers: submission.correct_answers,
            wrong_answers: submission.wrong_answers,
            unanswered: submission.unanswered,
            total_questions: submission.total_questions,
            score,
            time_taken: submission.time_taken,
        })
        .await?;

    tracing::info!(
        "User {} submitted quiz {}: {} ({}/{})",
        result.user_id,
        result.quiz_id,
        result.score,
        result.correct_answers,
        result.total_questions
    );

    Ok(result)
}

/// Rewrites an existing attempt in place.
///
/// Counts missing from `changes` keep their stored values; the score is
/// recomputed from the merged counts. Only the attempt's owner may do this.
pub async fn update_result(
    store: &dyn Store,
    user_id: Uuid,
    id: Uuid,
    changes: UpdateResultRequest,
) -> Result<ResultRecord, AppError> {
    let existing = store
        .find_result(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Result not found".to_string()))?;

    if existing.user_id != user_id {
        return Err(AppError::Forbidden("You can only update your own results".to_string()));
    }

    let merged = merge_counts(&existing, changes);

    store
        .update_result(id, &merged)
        .await?
        .ok_or_else(|| AppError::NotFound("Result not found".to_string()))
}

fn merge_counts(existing: &ResultRecord, changes: UpdateResultRequest) -> ResultChanges {
    let correct_answers = changes.correct_answers.unwrap_or(existing.correct_answers);
    let total_questions = changes.total_questions.unwrap_or(existing.total_questions);

    ResultChanges {
        correct_answers,
        wrong_answers: changes.wrong_answers.unwrap_or(existing.wrong_answers),
        unanswered: changes.unanswered.unwrap_or(existing.unanswered),
        total_questions,
        score: compute_score(correct_answers, total_questions),
        time_taken: changes.time_taken.or(existing.time_taken),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compute_score_percentage() {
        assert_eq!(compute_score(7, 10), "70.00");
        assert_eq!(compute_score(1, 1), "100.00");
        assert_eq!(compute_score(0, 4), "0.00");
    }

    #[test]
    fn test_compute_score_rounds_to_two_decimals() {
        assert_eq!(compute_score(1, 3), "33.33");
        assert_eq!(compute_score(2, 3), "66.67");
        assert_eq!(compute_score(1, 8), "12.50");
    }

    #[test]
    fn test_compute_score_zero_total() {
        assert_eq!(compute_score(0, 0), "0.00");
        assert_eq!(compute_score(5, 0), "0.00");
    }

    #[test]
    fn test_compute_score_does_not_clamp_loose_counts() {
        // Counts are not cross-checked against the total.
        assert_eq!(compute_score(12, 10), "120.00");
    }

    #[test]
    fn test_merge_counts_recomputes_score() {
        let existing = ResultRecord {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            quiz_id: Uuid::new_v4(),
            user_name: "Bo".to_string(),
            user_email: "bo@example.com".to_string(),
            correct_answers: 1,
            wrong_answers: 3,
            unanswered: 0,
            total_questions: 4,
            score: "25.00".to_string(),
            time_taken: Some(3),
            created_at: chrono::Utc::now(),
        };

        let merged = merge_counts(
            &existing,
            UpdateResultRequest {
                correct_answers: Some(3),
                wrong_answers: Some(1),
                ..Default::default()
            },
        );

        assert_eq!(merged.score, "75.00");
        assert_eq!(merged.total_questions, 4);
        assert_eq!(merged.time_taken, Some(3));
    }
}
