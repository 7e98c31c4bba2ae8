//! In-process store for tests and database-less local runs.
//!
//! Each collection sits behind one `RwLock`; an upsert holds the write guard
//! for its whole lookup-and-write, so same-key upserts serialize.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{LogStore, SortOrder, StoreResult};
use crate::models::activity::{ActivityData, ActivityLog, LogType};
use crate::models::score::DailyScore;
use crate::models::usage::{AiUsageMarker, FeatureType};

#[derive(Debug, Default)]
pub struct MemoryStore {
    scores: RwLock<HashMap<(Uuid, NaiveDate), DailyScore>>,
    activity: RwLock<Vec<ActivityLog>>,
    usage: RwLock<Vec<AiUsageMarker>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an entry with an explicit timestamp.
    #[cfg(test)]
    pub async fn insert_activity_at(
        &self,
        user_id: Uuid,
        data: ActivityData,
        created_at: DateTime<Utc>,
    ) -> ActivityLog {
        let log = ActivityLog {
            id: Uuid::new_v4(),
            user_id,
            created_at,
            data,
        };
        self.activity.write().await.push(log.clone());
        log
    }

    #[cfg(test)]
    pub async fn record_usage_at(&self, user_id: Uuid, feature: FeatureType, used_at: DateTime<Utc>) {
        self.usage.write().await.push(AiUsageMarker {
            id: Uuid::new_v4(),
            user_id,
            feature_type: feature,
            used_at,
        });
    }
}

fn sort_scores(rows: &mut [DailyScore], order: SortOrder) {
    rows.sort_by_key(|s| s.log_date);
    if order == SortOrder::Desc {
        rows.reverse();
    }
}

fn sort_activity(rows: &mut [ActivityLog], order: SortOrder) {
    rows.sort_by_key(|l| l.created_at);
    if order == SortOrder::Desc {
        rows.reverse();
    }
}

#[async_trait]
impl LogStore for MemoryStore {
    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }

    async fn upsert_score(
        &self,
        user_id: Uuid,
        log_date: NaiveDate,
        score: i32,
        note: Option<String>,
    ) -> StoreResult<DailyScore> {
        let mut scores = self.scores.write().await;
        let now = Utc::now();
        let entry = scores
            .entry((user_id, log_date))
            .and_modify(|existing| {
                existing.score = score;
                existing.note = note.clone();
                existing.updated_at = now;
            })
            .or_insert_with(|| DailyScore {
                id: Uuid::new_v4(),
                user_id,
                log_date,
                score,
                note: note.clone(),
                created_at: now,
                updated_at: now,
            });
        Ok(entry.clone())
    }

    async fn scores_in_range(
        &self,
        user_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
        order: SortOrder,
    ) -> StoreResult<Vec<DailyScore>> {
        let scores = self.scores.read().await;
        let mut rows: Vec<DailyScore> = scores
            .values()
            .filter(|s| s.user_id == user_id && s.log_date >= start && s.log_date <= end)
            .cloned()
            .collect();
        sort_scores(&mut rows, order);
        Ok(rows)
    }

    async fn all_scores(&self, user_id: Uuid, order: SortOrder) -> StoreResult<Vec<DailyScore>> {
        let scores = self.scores.read().await;
        let mut rows: Vec<DailyScore> = scores
            .values()
            .filter(|s| s.user_id == user_id)
            .cloned()
            .collect();
        sort_scores(&mut rows, order);
        Ok(rows)
    }

    async fn delete_score(&self, user_id: Uuid, id: Uuid) -> StoreResult<bool> {
        let mut scores = self.scores.write().await;
        let before = scores.len();
        scores.retain(|_, s| !(s.id == id && s.user_id == user_id));
        Ok(scores.len() < before)
    }

    async fn insert_activity(&self, user_id: Uuid, data: ActivityData) -> StoreResult<ActivityLog> {
        let log = ActivityLog {
            id: Uuid::new_v4(),
            user_id,
            created_at: Utc::now(),
            data,
        };
        self.activity.write().await.push(log.clone());
        Ok(log)
    }

    async fn activity_in_range(
        &self,
        user_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        log_type: Option<LogType>,
        order: SortOrder,
    ) -> StoreResult<Vec<ActivityLog>> {
        let activity = self.activity.read().await;
        let mut rows: Vec<ActivityLog> = activity
            .iter()
            .filter(|l| l.user_id == user_id && l.created_at >= from && l.created_at < to)
            .filter(|l| log_type.map_or(true, |t| l.data.log_type() == t))
            .cloned()
            .collect();
        sort_activity(&mut rows, order);
        Ok(rows)
    }

    async fn all_activity(&self, user_id: Uuid, order: SortOrder) -> StoreResult<Vec<ActivityLog>> {
        let activity = self.activity.read().await;
        let mut rows: Vec<ActivityLog> = activity
            .iter()
            .filter(|l| l.user_id == user_id)
            .cloned()
            .collect();
        sort_activity(&mut rows, order);
        Ok(rows)
    }

    async fn delete_activity(&self, user_id: Uuid, id: Uuid) -> StoreResult<bool> {
        let mut activity = self.activity.write().await;
        let before = activity.len();
        activity.retain(|l| !(l.id == id && l.user_id == user_id));
        Ok(activity.len() < before)
    }

    async fn record_usage(&self, user_id: Uuid, feature: FeatureType) -> StoreResult<AiUsageMarker> {
        let marker = AiUsageMarker {
            id: Uuid::new_v4(),
            user_id,
            feature_type: feature,
            used_at: Utc::now(),
        };
        self.usage.write().await.push(marker.clone());
        Ok(marker)
    }

    async fn last_usage(
        &self,
        user_id: Uuid,
        feature: FeatureType,
    ) -> StoreResult<Option<DateTime<Utc>>> {
        let usage = self.usage.read().await;
        Ok(usage
            .iter()
            .filter(|m| m.user_id == user_id && m.feature_type == feature)
            .map(|m| m.used_at)
            .max())
    }
}
