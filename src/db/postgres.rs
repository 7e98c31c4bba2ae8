use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use super::{LogStore, SortOrder, StoreError, StoreResult};
use crate::models::activity::{ActivityData, ActivityLog, LogType};
use crate::models::score::DailyScore;
use crate::models::usage::{AiUsageMarker, FeatureType};

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct ActivityLogRow {
    id: Uuid,
    user_id: Uuid,
    log_type: String,
    data: serde_json::Value,
    created_at: DateTime<Utc>,
}

impl TryFrom<ActivityLogRow> for ActivityLog {
    type Error = StoreError;

    fn try_from(row: ActivityLogRow) -> Result<Self, Self::Error> {
        let log_type = LogType::parse(&row.log_type).ok_or_else(|| StoreError::Corrupt {
            id: row.id,
            reason: format!("unknown log_type '{}'", row.log_type),
        })?;
        let data = ActivityData::from_payload(log_type, row.data).map_err(|e| {
            StoreError::Corrupt {
                id: row.id,
                reason: e.to_string(),
            }
        })?;
        Ok(ActivityLog {
            id: row.id,
            user_id: row.user_id,
            created_at: row.created_at,
            data,
        })
    }
}

fn into_logs(rows: Vec<ActivityLogRow>) -> StoreResult<Vec<ActivityLog>> {
    rows.into_iter().map(ActivityLog::try_from).collect()
}

#[async_trait]
impl LogStore for PgStore {
    async fn ping(&self) -> StoreResult<()> {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await?;
        Ok(())
    }

    async fn upsert_score(
        &self,
        user_id: Uuid,
        log_date: NaiveDate,
        score: i32,
        note: Option<String>,
    ) -> StoreResult<DailyScore> {
        // Single statement: concurrent submissions for the same key serialize
        // on the unique index instead of racing a SELECT.
        let row = sqlx::query_as::<_, DailyScore>(
            r#"
            INSERT INTO daily_scores (id, user_id, log_date, score, note)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (user_id, log_date) DO UPDATE SET
                score = EXCLUDED.score,
                note = EXCLUDED.note,
                updated_at = NOW()
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(log_date)
        .bind(score)
        .bind(&note)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    async fn scores_in_range(
        &self,
        user_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
        order: SortOrder,
    ) -> StoreResult<Vec<DailyScore>> {
        let sql = format!(
            r#"
            SELECT * FROM daily_scores
            WHERE user_id = $1 AND log_date BETWEEN $2 AND $3
            ORDER BY log_date {}
            "#,
            order.as_sql()
        );
        let rows = sqlx::query_as::<_, DailyScore>(&sql)
            .bind(user_id)
            .bind(start)
            .bind(end)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn all_scores(&self, user_id: Uuid, order: SortOrder) -> StoreResult<Vec<DailyScore>> {
        let sql = format!(
            "SELECT * FROM daily_scores WHERE user_id = $1 ORDER BY log_date {}",
            order.as_sql()
        );
        let rows = sqlx::query_as::<_, DailyScore>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn delete_score(&self, user_id: Uuid, id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM daily_scores WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn insert_activity(&self, user_id: Uuid, data: ActivityData) -> StoreResult<ActivityLog> {
        let row = sqlx::query_as::<_, ActivityLogRow>(
            r#"
            INSERT INTO activity_logs (id, user_id, log_type, data)
            VALUES ($1, $2, $3, $4)
            RETURNING id, user_id, log_type, data, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(data.log_type().as_str())
        .bind(data.payload())
        .fetch_one(&self.pool)
        .await?;

        ActivityLog::try_from(row)
    }

    async fn activity_in_range(
        &self,
        user_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        log_type: Option<LogType>,
        order: SortOrder,
    ) -> StoreResult<Vec<ActivityLog>> {
        let sql = format!(
            r#"
            SELECT id, user_id, log_type, data, created_at FROM activity_logs
            WHERE user_id = $1
              AND created_at >= $2 AND created_at < $3
              AND ($4::text IS NULL OR log_type = $4)
            ORDER BY created_at {}
            "#,
            order.as_sql()
        );
        let rows = sqlx::query_as::<_, ActivityLogRow>(&sql)
            .bind(user_id)
            .bind(from)
            .bind(to)
            .bind(log_type.map(|t| t.as_str()))
            .fetch_all(&self.pool)
            .await?;
        into_logs(rows)
    }

    async fn all_activity(&self, user_id: Uuid, order: SortOrder) -> StoreResult<Vec<ActivityLog>> {
        let sql = format!(
            r#"
            SELECT id, user_id, log_type, data, created_at FROM activity_logs
            WHERE user_id = $1
            ORDER BY created_at {}
            "#,
            order.as_sql()
        );
        let rows = sqlx::query_as::<_, ActivityLogRow>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;
        into_logs(rows)
    }

    async fn delete_activity(&self, user_id: Uuid, id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM activity_logs WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn record_usage(&self, user_id: Uuid, feature: FeatureType) -> StoreResult<AiUsageMarker> {
        let (id, used_at) = sqlx::query_as::<_, (Uuid, DateTime<Utc>)>(
            r#"
            INSERT INTO ai_usage_logs (id, user_id, feature_type)
            VALUES ($1, $2, $3)
            RETURNING id, used_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(feature.as_str())
        .fetch_one(&self.pool)
        .await?;

        Ok(AiUsageMarker {
            id,
            user_id,
            feature_type: feature,
            used_at,
        })
    }

    async fn last_usage(
        &self,
        user_id: Uuid,
        feature: FeatureType,
    ) -> StoreResult<Option<DateTime<Utc>>> {
        let used_at = sqlx::query_scalar::<_, DateTime<Utc>>(
            r#"
            SELECT used_at FROM ai_usage_logs
            WHERE user_id = $1 AND feature_type = $2
            ORDER BY used_at DESC
            LIMIT 1
            "#,
        )
        .bind(user_id)
        .bind(feature.as_str())
        .fetch_optional(&self.pool)
        .await?;
        Ok(used_at)
    }
}
