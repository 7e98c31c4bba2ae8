use axum::{extract::State, Extension, Json};
use chrono::Utc;

use crate::auth::middleware::AuthUser;
use crate::db::SortOrder;
use crate::dto::FeedbackResponse;
use crate::error::AppResult;
use crate::services::date_window::trailing_window;
use crate::services::feedback::{assemble, request_feedback};
use crate::services::prompts::{activity_feedback_prompt, score_feedback_prompt};
use crate::AppState;

/// GET /api/scores/feedback: coaching on the recent daily scores.
pub async fn score_feedback(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> AppResult<Json<FeedbackResponse>> {
    let today = Utc::now().date_naive();
    let window_days = state.config.feedback_window_days;
    let window = trailing_window(today, window_days);

    let scores = state
        .store
        .scores_in_range(auth_user.id, window.start, window.end, SortOrder::Asc)
        .await?;

    let outcome = assemble(&scores, state.config.feedback_min_records, window_days, today);
    let result = request_feedback(state.ai.as_ref(), outcome, window_days, score_feedback_prompt).await;

    tracing::debug!(user_id = %auth_user.id, outcome = ?result, "Score feedback");
    Ok(Json(result.into()))
}

/// GET /api/feedback: coaching across focus and life logs.
pub async fn activity_feedback(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> AppResult<Json<FeedbackResponse>> {
    let today = Utc::now().date_naive();
    let window_days = state.config.feedback_window_days;
    let (from, to) = trailing_window(today, window_days).utc_bounds();

    let logs = state
        .store
        .activity_in_range(auth_user.id, from, to, None, SortOrder::Asc)
        .await?;

    let outcome = assemble(&logs, state.config.feedback_min_records, window_days, today);
    let result = request_feedback(state.ai.as_ref(), outcome, window_days, activity_feedback_prompt).await;

    tracing::debug!(user_id = %auth_user.id, outcome = ?result, "Activity feedback");
    Ok(Json(result.into()))
}
