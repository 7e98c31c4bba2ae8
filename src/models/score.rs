use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// One score per user per calendar day. `(user_id, log_date)` is the natural key.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct DailyScore {
    pub id: Uuid,
    pub user_id: Uuid,
    pub log_date: NaiveDate,
    pub score: i32,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// POST /api/scores
///
/// `date` stays a string so malformed values surface as our own validation
/// error instead of an extractor rejection. Defaults to today (UTC).
#[derive(Debug, Deserialize, Validate)]
pub struct UpsertScoreRequest {
    pub date: Option<String>,

    #[validate(range(min = 0, max = 100, message = "Score must be between 0 and 100"))]
    pub score: Option<i32>,

    #[validate(length(max = 2000, message = "Note must be under 2000 characters"))]
    pub note: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct WeekQuery {
    pub date: Option<String>,
}
