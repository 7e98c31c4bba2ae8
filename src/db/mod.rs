//! Log storage.
//!
//! Every operation is scoped to an owner id. Range queries take an explicit
//! [`SortOrder`]; nothing relies on backend default ordering.

pub mod memory;
pub mod pool;
pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::models::activity::{ActivityData, ActivityLog, LogType};
use crate::models::score::DailyScore;
use crate::models::usage::{AiUsageMarker, FeatureType};

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(sqlx::Error),

    /// A unique constraint fired on a path the upsert should have covered.
    #[error("natural key conflict: {0}")]
    Conflict(String),

    #[error("corrupt record {id}: {reason}")]
    Corrupt { id: Uuid, reason: String },
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        if let Some(db_err) = e.as_database_error() {
            if db_err.code().as_deref() == Some("23505") {
                return StoreError::Conflict(db_err.message().to_string());
            }
        }
        StoreError::Database(e)
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    fn as_sql(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

#[async_trait]
pub trait LogStore: Send + Sync {
    /// Cheap round-trip used by the readiness probe.
    async fn ping(&self) -> StoreResult<()>;

    // ==================== Daily scores ====================

    /// Insert or overwrite the score for `(user_id, log_date)` in one atomic
    /// step. An existing row keeps its id; `score` and `note` are replaced.
    async fn upsert_score(
        &self,
        user_id: Uuid,
        log_date: NaiveDate,
        score: i32,
        note: Option<String>,
    ) -> StoreResult<DailyScore>;

    /// Scores with `start <= log_date <= end`.
    async fn scores_in_range(
        &self,
        user_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
        order: SortOrder,
    ) -> StoreResult<Vec<DailyScore>>;

    async fn all_scores(&self, user_id: Uuid, order: SortOrder) -> StoreResult<Vec<DailyScore>>;

    /// Returns `false` when no row with that id belongs to the user.
    async fn delete_score(&self, user_id: Uuid, id: Uuid) -> StoreResult<bool>;

    // ==================== Activity logs ====================

    async fn insert_activity(&self, user_id: Uuid, data: ActivityData) -> StoreResult<ActivityLog>;

    /// Entries with `from <= created_at < to`, optionally of a single type.
    async fn activity_in_range(
        &self,
        user_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        log_type: Option<LogType>,
        order: SortOrder,
    ) -> StoreResult<Vec<ActivityLog>>;

    async fn all_activity(&self, user_id: Uuid, order: SortOrder) -> StoreResult<Vec<ActivityLog>>;

    async fn delete_activity(&self, user_id: Uuid, id: Uuid) -> StoreResult<bool>;

    // ==================== Cooldown markers ====================

    async fn record_usage(&self, user_id: Uuid, feature: FeatureType) -> StoreResult<AiUsageMarker>;

    async fn last_usage(
        &self,
        user_id: Uuid,
        feature: FeatureType,
    ) -> StoreResult<Option<DateTime<Utc>>>;
}
