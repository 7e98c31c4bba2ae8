use axum::{extract::State, Extension, Json};
use chrono::{Duration, Utc};
use serde::Deserialize;
use validator::Validate;

use crate::auth::middleware::AuthUser;
use crate::db::SortOrder;
use crate::dto::{
    is_conversation_start, FocusChatRequest, FocusChatResponse, LoungeChatRequest,
    LoungeChatResponse,
};
use crate::error::{AppError, AppResult};
use crate::models::activity::{ActivityData, FocusData, LifeData, LogType};
use crate::models::usage::FeatureType;
use crate::services::cooldown::begin_conversation;
use crate::services::extract::{extract_marked_json, parse_json_reply};
use crate::services::prompts::{focus_chat_prompt, lounge_chat_prompt};
use crate::services::scoring::score_focus;
use crate::AppState;

const FOCUS_SAVED_NOTE: &str = "(Focus session recorded.)";
const LIFE_SAVED_NOTE: &str = "(Life log recorded.)";

/// What the coach has gathered so far. Either field may still be missing.
#[derive(Debug, Deserialize)]
struct FocusDraft {
    task_content: Option<String>,
    duration_minutes: Option<i32>,
}

impl FocusDraft {
    fn complete(self, known_duration: Option<i32>) -> Option<FocusData> {
        let focus = FocusData {
            task_content: self.task_content?.trim().to_string(),
            duration_minutes: self.duration_minutes.or(known_duration)?,
            score: None,
            ai_feedback: None,
        };
        focus.validate().ok()?;
        Some(focus)
    }
}

fn required_message(message: Option<String>) -> AppResult<String> {
    message
        .filter(|m| !m.trim().is_empty())
        .ok_or_else(|| AppError::Validation("message is required".into()))
}

pub async fn focus_chat(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(body): Json<FocusChatRequest>,
) -> AppResult<Json<FocusChatResponse>> {
    body.validate()?;
    let message = required_message(body.message)?;

    if is_conversation_start(&body.history) {
        begin_conversation(
            state.store.as_ref(),
            &state.config,
            auth_user.id,
            FeatureType::Focus,
        )
        .await?;
    }

    let prompt = focus_chat_prompt(&body.history, &message, body.known_duration);
    let reply = state.ai.generate(&prompt).await.map_err(|e| {
        tracing::error!(user_id = %auth_user.id, error = %e, "Focus chat gateway call failed");
        AppError::Gateway(e)
    })?;

    let draft = extract_marked_json(&reply)
        .map(|found| found.value)
        .or_else(|| parse_json_reply(&reply))
        .and_then(|value| serde_json::from_value::<FocusDraft>(value).ok())
        .and_then(|draft| draft.complete(body.known_duration));

    let Some(mut focus) = draft else {
        return Ok(Json(FocusChatResponse {
            reply,
            focus_log_saved: false,
        }));
    };

    score_focus(state.ai.as_ref(), &mut focus).await;
    let feedback = focus.ai_feedback.clone().unwrap_or_default();

    let log = state
        .store
        .insert_activity(auth_user.id, ActivityData::Focus(focus))
        .await?;

    tracing::info!(user_id = %auth_user.id, log_id = %log.id, "Focus session recorded from chat");

    Ok(Json(FocusChatResponse {
        reply: format!("{}\n\n{}", feedback, FOCUS_SAVED_NOTE),
        focus_log_saved: true,
    }))
}

pub async fn lounge_chat(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(body): Json<LoungeChatRequest>,
) -> AppResult<Json<LoungeChatResponse>> {
    body.validate()?;
    let message = required_message(body.message)?;

    if is_conversation_start(&body.history) {
        begin_conversation(
            state.store.as_ref(),
            &state.config,
            auth_user.id,
            FeatureType::Lounge,
        )
        .await?;
    }

    let now = Utc::now();
    let recent_focus = state
        .store
        .activity_in_range(
            auth_user.id,
            now - Duration::hours(24),
            now,
            Some(LogType::Focus),
            SortOrder::Desc,
        )
        .await?;

    let prompt = lounge_chat_prompt(&recent_focus, &body.history, &message);
    let reply = state.ai.generate(&prompt).await.map_err(|e| {
        tracing::error!(user_id = %auth_user.id, error = %e, "Lounge chat gateway call failed");
        AppError::Gateway(e)
    })?;

    let Some(found) = extract_marked_json(&reply) else {
        return Ok(Json(LoungeChatResponse {
            reply,
            life_log_saved: false,
            life_log_data: None,
        }));
    };

    let life = match serde_json::from_value::<LifeData>(found.value) {
        Ok(life) if life.validate().is_ok() => life,
        Ok(_) | Err(_) => {
            tracing::warn!(user_id = %auth_user.id, "Lounge payload rejected, returning reply as-is");
            return Ok(Json(LoungeChatResponse {
                reply,
                life_log_saved: false,
                life_log_data: None,
            }));
        }
    };

    let log = state
        .store
        .insert_activity(auth_user.id, ActivityData::Life(life.clone()))
        .await?;

    tracing::info!(user_id = %auth_user.id, log_id = %log.id, "Life log recorded from chat");

    let reply = if found.remainder.is_empty() {
        LIFE_SAVED_NOTE.to_string()
    } else {
        format!("{}\n\n{}", found.remainder, LIFE_SAVED_NOTE)
    };

    Ok(Json(LoungeChatResponse {
        reply,
        life_log_saved: true,
        life_log_data: Some(life),
    }))
}
