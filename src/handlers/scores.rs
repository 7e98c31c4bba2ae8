use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use crate::auth::middleware::AuthUser;
use crate::db::SortOrder;
use crate::dto::{DeleteResponse, RecentScoresResponse, ScoreEntry, WeeklyScoresResponse};
use crate::error::{AppError, AppResult};
use crate::models::score::{DailyScore, UpsertScoreRequest, WeekQuery};
use crate::services::date_window::{ensure_not_future, parse_date, trailing_window, week_window};
use crate::AppState;

pub async fn upsert_score(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(body): Json<UpsertScoreRequest>,
) -> AppResult<Json<DailyScore>> {
    body.validate()?;

    let score = body
        .score
        .ok_or_else(|| AppError::Validation("score is required".into()))?;

    let today = Utc::now().date_naive();
    let log_date = match body.date.as_deref() {
        Some(raw) => parse_date(raw, "date")?,
        None => today,
    };
    ensure_not_future(log_date, today)?;

    let note = body.note.filter(|n| !n.trim().is_empty());

    let row = state
        .store
        .upsert_score(auth_user.id, log_date, score, note)
        .await?;

    tracing::debug!(user_id = %auth_user.id, date = %log_date, score_id = %row.id, "Score upserted");
    Ok(Json(row))
}

pub async fn list_scores(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> AppResult<Json<Vec<DailyScore>>> {
    let rows = state.store.all_scores(auth_user.id, SortOrder::Asc).await?;
    Ok(Json(rows))
}

pub async fn weekly_scores(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Query(query): Query<WeekQuery>,
) -> AppResult<Json<WeeklyScoresResponse>> {
    let reference = match query.date.as_deref() {
        Some(raw) => parse_date(raw, "date")?,
        None => Utc::now().date_naive(),
    };
    let week = week_window(reference);

    let rows = state
        .store
        .scores_in_range(auth_user.id, week.start, week.end, SortOrder::Asc)
        .await?;

    Ok(Json(WeeklyScoresResponse {
        week_start: week.start,
        week_end: week.end,
        logs: rows.into_iter().map(ScoreEntry::from).collect(),
    }))
}

pub async fn recent_scores(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> AppResult<Json<RecentScoresResponse>> {
    let window = trailing_window(Utc::now().date_naive(), state.config.feedback_window_days);

    let rows = state
        .store
        .scores_in_range(auth_user.id, window.start, window.end, SortOrder::Asc)
        .await?;

    let average = if rows.is_empty() {
        0.0
    } else {
        let mean = rows.iter().map(|s| s.score as f64).sum::<f64>() / rows.len() as f64;
        (mean * 100.0).round() / 100.0
    };

    Ok(Json(RecentScoresResponse {
        window_start: window.start,
        window_end: window.end,
        scores: rows.into_iter().map(ScoreEntry::from).collect(),
        average,
    }))
}

pub async fn delete_score(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(score_id): Path<Uuid>,
) -> AppResult<Json<DeleteResponse>> {
    if !state.store.delete_score(auth_user.id, score_id).await? {
        return Err(AppError::NotFound("Score not found".into()));
    }

    Ok(Json(DeleteResponse {
        deleted: true,
        id: score_id,
    }))
}
