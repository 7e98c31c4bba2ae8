//! # Focus Log: Request/Response DTOs
//!
//! API contract types that are not persisted models.
//!
//! Conventions:
//! - `*Request`  → deserialized from client JSON body or query params
//! - `*Response` → serialized to client JSON
//! - Dates travel as `YYYY-MM-DD` strings and are parsed in the handler so a
//!   bad value becomes a validation error with our error envelope

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::activity::LifeData;
use crate::models::score::DailyScore;
use crate::services::day_projector::DayRow;

// ============================================================================
// Common
// ============================================================================

/// Standard delete confirmation
#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub deleted: bool,
    pub id: Uuid,
}

/// Feedback text plus where it came from: "ai", "insufficient_data" or "fallback"
#[derive(Debug, Serialize)]
pub struct FeedbackResponse {
    pub feedback: String,
    pub source: String,
}

// ============================================================================
// Scores
// ============================================================================

/// Score as shown in windowed views
#[derive(Debug, Serialize)]
pub struct ScoreEntry {
    pub id: Uuid,
    pub date: NaiveDate,
    pub score: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl From<DailyScore> for ScoreEntry {
    fn from(s: DailyScore) -> Self {
        Self {
            id: s.id,
            date: s.log_date,
            score: s.score,
            note: s.note,
        }
    }
}

/// GET /api/scores/week
#[derive(Debug, Serialize)]
pub struct WeeklyScoresResponse {
    pub week_start: NaiveDate,
    pub week_end: NaiveDate,
    pub logs: Vec<ScoreEntry>,
}

/// GET /api/scores/recent
#[derive(Debug, Serialize)]
pub struct RecentScoresResponse {
    pub window_start: NaiveDate,
    pub window_end: NaiveDate,
    pub scores: Vec<ScoreEntry>,
    /// Mean of `scores`, two decimals; 0 when empty
    pub average: f64,
}

// ============================================================================
// Activity
// ============================================================================

/// Response for POST /api/activity/log
#[derive(Debug, Serialize)]
pub struct SaveActivityResponse {
    pub message: String,
    pub log_id: Uuid,
}

/// GET /api/dashboard query params. Defaults to the current Monday-Sunday week.
#[derive(Debug, Deserialize)]
pub struct DashboardQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub chart_data: Vec<DayRow>,
}

// ============================================================================
// Chat
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatTurn {
    /// "user" or "ai"
    pub sender: String,
    pub text: String,
}

impl ChatTurn {
    pub fn is_user(&self) -> bool {
        self.sender == "user"
    }
}

/// POST /api/chat/focus
#[derive(Debug, Deserialize, Validate)]
pub struct FocusChatRequest {
    #[validate(length(max = 2000, message = "Message too long (max 2000 characters)"))]
    pub message: Option<String>,

    #[serde(default)]
    pub history: Vec<ChatTurn>,

    /// Duration already measured by the client's timer, in minutes
    pub known_duration: Option<i32>,
}

#[derive(Debug, Serialize)]
pub struct FocusChatResponse {
    pub reply: String,
    pub focus_log_saved: bool,
}

/// POST /api/chat/lounge
#[derive(Debug, Deserialize, Validate)]
pub struct LoungeChatRequest {
    #[validate(length(max = 500, message = "Message too long (max 500 characters)"))]
    pub message: Option<String>,

    #[serde(default)]
    pub history: Vec<ChatTurn>,
}

#[derive(Debug, Serialize)]
pub struct LoungeChatResponse {
    pub reply: String,
    pub life_log_saved: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub life_log_data: Option<LifeData>,
}

/// A conversation is starting when no user turn has been sent yet.
pub fn is_conversation_start(history: &[ChatTurn]) -> bool {
    !history.iter().any(ChatTurn::is_user)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_request_history_defaults_empty() {
        let req: LoungeChatRequest = serde_json::from_str(r#"{"message":"hi"}"#).unwrap();
        assert!(req.history.is_empty());
        assert!(is_conversation_start(&req.history));
    }

    #[test]
    fn test_conversation_start_ignores_ai_turns() {
        let history = vec![ChatTurn {
            sender: "ai".into(),
            text: "Welcome back".into(),
        }];
        assert!(is_conversation_start(&history));

        let mut with_user = history.clone();
        with_user.push(ChatTurn {
            sender: "user".into(),
            text: "hello".into(),
        });
        assert!(!is_conversation_start(&with_user));
    }

    #[test]
    fn test_lounge_message_length_validated() {
        let req = LoungeChatRequest {
            message: Some("x".repeat(501)),
            history: vec![],
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_lounge_response_omits_missing_payload() {
        let resp = LoungeChatResponse {
            reply: "ok".into(),
            life_log_saved: false,
            life_log_data: None,
        };
        let json = serde_json::to_value(&resp).unwrap();
        assert!(json.get("life_log_data").is_none());
    }
}
