use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use uuid::Uuid;

use crate::auth::middleware::AuthUser;
use crate::db::SortOrder;
use crate::dto::{DeleteResponse, SaveActivityResponse};
use crate::error::{AppError, AppResult};
use crate::models::activity::{ActivityData, ActivityLog, SaveActivityRequest};
use crate::services::scoring::score_focus;
use crate::AppState;

pub async fn save_activity(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(body): Json<SaveActivityRequest>,
) -> AppResult<(StatusCode, Json<SaveActivityResponse>)> {
    let mut data = ActivityData::from_parts(body.log_type.as_deref(), body.data)?;

    // Focus sessions get scored before they are stored.
    if let ActivityData::Focus(focus) = &mut data {
        score_focus(state.ai.as_ref(), focus).await;
    }

    let log = state.store.insert_activity(auth_user.id, data).await?;

    tracing::info!(
        user_id = %auth_user.id,
        log_id = %log.id,
        log_type = log.data.log_type().as_str(),
        "Activity logged"
    );

    Ok((
        StatusCode::CREATED,
        Json(SaveActivityResponse {
            message: "Log saved".into(),
            log_id: log.id,
        }),
    ))
}

/// Full history, newest first.
pub async fn history(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> AppResult<Json<Vec<ActivityLog>>> {
    let logs = state.store.all_activity(auth_user.id, SortOrder::Desc).await?;
    Ok(Json(logs))
}

pub async fn delete_activity(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(log_id): Path<Uuid>,
) -> AppResult<Json<DeleteResponse>> {
    if !state.store.delete_activity(auth_user.id, log_id).await? {
        return Err(AppError::NotFound("Log not found".into()));
    }

    Ok(Json(DeleteResponse {
        deleted: true,
        id: log_id,
    }))
}
