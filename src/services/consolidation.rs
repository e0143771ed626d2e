// src/services/consolidation.rs

//! "Latest attempt wins" views over the append-only results history.
//!
//! The store filters by user or quiz; the reduction happens here. Among
//! rows of one group the latest is the one with the greatest
//! `(created_at, id)`, so equal timestamps resolve to the highest id.

use std::collections::BTreeMap;

use uuid::Uuid;

use crate::{
    error::AppError,
    models::result::{AttemptSummary, QuizResults, ResultRecord, UserResults},
    store::Store,
};

fn is_newer(candidate: &ResultRecord, current: &ResultRecord) -> bool {
    (candidate.created_at, candidate.id) > (current.created_at, current.id)
}

/// Reduces rows to the latest one per key, counting the rows of each group.
pub fn reduce_latest<K, F>(rows: Vec<ResultRecord>, key: F) -> BTreeMap<K, AttemptSummary>
where
    K: Ord,
    F: Fn(&ResultRecord) -> K,
{
    let mut groups: BTreeMap<K, AttemptSummary> = BTreeMap::new();

    for row in rows {
        match groups.entry(key(&row)) {
            std::collections::btree_map::Entry::Vacant(slot) => {
                slot.insert(AttemptSummary { latest: row, attempts: 1 });
            }
            std::collections::btree_map::Entry::Occupied(mut slot) => {
                let summary = slot.get_mut();
                summary.attempts += 1;
                if is_newer(&row, &summary.latest) {
                    summary.latest = row;
                }
            }
        }
    }

    groups
}

/// The current standing of `user_id` on `quiz_id`, if they ever submitted.
pub async fn latest_attempt(
    store: &dyn Store,
    user_id: Uuid,
    quiz_id: Uuid,
) -> Result<Option<ResultRecord>, AppError> {
    let rows = store.results_for_user_and_quiz(user_id, quiz_id).await?;

    Ok(rows.into_iter().reduce(|latest, row| if is_newer(&row, &latest) { row } else { latest }))
}

/// Quiz id -> latest attempt of `user_id` on that quiz.
pub async fn latest_per_quiz(
    store: &dyn Store,
    user_id: Uuid,
) -> Result<BTreeMap<Uuid, ResultRecord>, AppError> {
    let rows = store.results_for_user(user_id).await?;

    Ok(reduce_latest(rows, |r| r.quiz_id)
        .into_iter()
        .map(|(quiz_id, summary)| (quiz_id, summary.latest))
        .collect())
}

/// User id -> latest attempt on `quiz_id` and the number of attempts made.
pub async fn attempt_counts(
    store: &dyn Store,
    quiz_id: Uuid,
) -> Result<BTreeMap<Uuid, AttemptSummary>, AppError> {
    let rows = store.results_for_quiz(quiz_id).await?;
    Ok(reduce_latest(rows, |r| r.user_id))
}

/// Results page of a quiz: one entry per user, most recent standing first.
pub async fn quiz_results(store: &dyn Store, quiz_id: Uuid) -> Result<QuizResults, AppError> {
    let quiz = store
        .find_quiz(quiz_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Quiz not found".to_string()))?;

    let mut results: Vec<AttemptSummary> = attempt_counts(store, quiz_id).await?.into_values().collect();
    results.sort_by(|a, b| (b.latest.created_at, b.latest.id).cmp(&(a.latest.created_at, a.latest.id)));

    Ok(QuizResults {
        quiz_title: quiz.title,
        results,
    })
}

/// Every attempt of a user plus the latest one per quiz.
pub async fn user_results(store: &dyn Store, user_id: Uuid) -> Result<UserResults, AppError> {
    let latest = latest_per_quiz(store, user_id).await?;
    let history = store.results_for_user(user_id).await?;

    Ok(UserResults {
        user_id,
        latest,
        history,
    })
}
