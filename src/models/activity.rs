use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::error::{AppError, AppResult};

/// A focus or life entry. Several may exist per day; the dashboard merges them.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ActivityLog {
    pub id: Uuid,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    #[serde(flatten)]
    pub data: ActivityData,
}

impl ActivityLog {
    /// Calendar day the entry is filed under (UTC).
    pub fn day(&self) -> NaiveDate {
        self.created_at.date_naive()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogType {
    Focus,
    Life,
}

impl LogType {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogType::Focus => "focus",
            LogType::Life => "life",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "focus" => Some(LogType::Focus),
            "life" => Some(LogType::Life),
            _ => None,
        }
    }
}

/// Payload keyed by `log_type`. Serializes as `{"log_type": ..., "data": {...}}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "log_type", content = "data", rename_all = "lowercase")]
pub enum ActivityData {
    Focus(FocusData),
    Life(LifeData),
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
pub struct FocusData {
    #[validate(length(min = 1, max = 500, message = "task_content must be 1-500 characters"))]
    pub task_content: String,

    #[validate(range(min = 1, max = 1440, message = "duration_minutes must be 1-1440"))]
    pub duration_minutes: i32,

    #[validate(range(min = 0, max = 100, message = "score must be 0-100"))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<i32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_feedback: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, PartialEq)]
#[validate(schema(function = "require_life_metric", skip_on_field_errors = false))]
pub struct LifeData {
    #[validate(range(min = 0.0, max = 24.0, message = "sleep_hours must be 0-24"))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sleep_hours: Option<f64>,

    /// Minutes of screen time.
    #[validate(range(min = 0, max = 1440, message = "screen_time must be 0-1440"))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub screen_time: Option<i32>,

    #[validate(range(min = 1, max = 5, message = "mood must be 1-5"))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mood: Option<i32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_advice: Option<String>,
}

fn require_life_metric(data: &LifeData) -> Result<(), ValidationError> {
    if data.sleep_hours.is_none() && data.screen_time.is_none() && data.mood.is_none() {
        let mut err = ValidationError::new("life_metric_missing");
        err.message = Some("a life log needs at least one of sleep_hours, screen_time, mood".into());
        return Err(err);
    }
    Ok(())
}

impl ActivityData {
    pub fn log_type(&self) -> LogType {
        match self {
            ActivityData::Focus(_) => LogType::Focus,
            ActivityData::Life(_) => LogType::Life,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationErrors> {
        match self {
            ActivityData::Focus(focus) => focus.validate(),
            ActivityData::Life(life) => life.validate(),
        }
    }

    /// Build from the loose `{log_type, data}` request shape, validating the payload.
    pub fn from_parts(log_type: Option<&str>, data: Option<serde_json::Value>) -> AppResult<Self> {
        let log_type = log_type
            .and_then(LogType::parse)
            .ok_or_else(|| AppError::Validation("log_type must be 'focus' or 'life'".into()))?;
        let data = data.ok_or_else(|| AppError::Validation("data is required".into()))?;

        let parsed = match log_type {
            LogType::Focus => serde_json::from_value(data).map(ActivityData::Focus),
            LogType::Life => serde_json::from_value(data).map(ActivityData::Life),
        }
        .map_err(|e| AppError::Validation(format!("Invalid {} data: {}", log_type.as_str(), e)))?;

        parsed.validate()?;
        Ok(parsed)
    }

    /// Serialize only the inner payload, as stored in the `data` column.
    pub fn payload(&self) -> serde_json::Value {
        let value = match self {
            ActivityData::Focus(focus) => serde_json::to_value(focus),
            ActivityData::Life(life) => serde_json::to_value(life),
        };
        value.unwrap_or(serde_json::Value::Null)
    }

    /// Inverse of [`payload`](Self::payload).
    pub fn from_payload(log_type: LogType, payload: serde_json::Value) -> serde_json::Result<Self> {
        match log_type {
            LogType::Focus => serde_json::from_value(payload).map(ActivityData::Focus),
            LogType::Life => serde_json::from_value(payload).map(ActivityData::Life),
        }
    }
}

/// POST /api/activity/log
#[derive(Debug, Deserialize)]
pub struct SaveActivityRequest {
    pub log_type: Option<String>,
    pub data: Option<serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_focus_from_parts() {
        let data = ActivityData::from_parts(
            Some("focus"),
            Some(json!({"task_content": "Write report", "duration_minutes": 25})),
        )
        .unwrap();
        match data {
            ActivityData::Focus(f) => {
                assert_eq!(f.task_content, "Write report");
                assert_eq!(f.duration_minutes, 25);
                assert!(f.score.is_none());
            }
            other => panic!("expected focus, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_log_type_rejected() {
        let err = ActivityData::from_parts(Some("sleep"), Some(json!({}))).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_missing_data_rejected() {
        let err = ActivityData::from_parts(Some("life"), None).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_focus_without_duration_rejected() {
        let err = ActivityData::from_parts(Some("focus"), Some(json!({"task_content": "x"})))
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_life_needs_a_metric() {
        let err = ActivityData::from_parts(Some("life"), Some(json!({"ai_advice": "rest"})))
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_life_mood_out_of_range() {
        let err = ActivityData::from_parts(Some("life"), Some(json!({"mood": 9}))).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_life_partial_fields_accepted() {
        let data =
            ActivityData::from_parts(Some("life"), Some(json!({"sleep_hours": 7.5}))).unwrap();
        assert_eq!(
            data,
            ActivityData::Life(LifeData {
                sleep_hours: Some(7.5),
                ..Default::default()
            })
        );
    }

    #[test]
    fn test_activity_log_serializes_with_type_tag() {
        let log = ActivityLog {
            id: Uuid::nil(),
            user_id: Uuid::nil(),
            created_at: Utc::now(),
            data: ActivityData::Life(LifeData {
                mood: Some(4),
                ..Default::default()
            }),
        };
        let json = serde_json::to_value(&log).unwrap();
        assert_eq!(json["log_type"], "life");
        assert_eq!(json["data"]["mood"], 4);
        assert!(json["data"].get("sleep_hours").is_none());
    }

    #[test]
    fn test_payload_reverses() {
        let data = ActivityData::Focus(FocusData {
            task_content: "Deep work".into(),
            duration_minutes: 50,
            score: Some(80),
            ai_feedback: Some("Nice".into()),
        });
        let payload = data.payload();
        assert_eq!(payload["score"], 80);
        let back = ActivityData::from_payload(LogType::Focus, payload).unwrap();
        assert_eq!(back, data);
    }
}
