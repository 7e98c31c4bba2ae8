use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::config::Config;
use crate::db::LogStore;
use crate::error::{AppError, AppResult};
use crate::models::usage::FeatureType;

pub fn cooldown_secs(feature: FeatureType, config: &Config) -> i64 {
    match feature {
        FeatureType::Focus => config.focus_cooldown_secs,
        FeatureType::Lounge => config.lounge_cooldown_secs,
    }
}

/// Seconds left before the feature may be used again, if any.
pub fn remaining_secs(last_used: Option<DateTime<Utc>>, now: DateTime<Utc>, cooldown: i64) -> Option<i64> {
    let elapsed = (now - last_used?).num_seconds();
    let remaining = cooldown - elapsed;
    (remaining > 0).then_some(remaining)
}

pub fn cooldown_message(remaining: i64) -> String {
    let hours = remaining / 3600;
    let minutes = (remaining % 3600) / 60;
    match (hours, minutes) {
        (0, 0) => "Available again in less than a minute.".into(),
        (0, m) => format!("Available again in {}m.", m),
        (h, 0) => format!("Available again in {}h.", h),
        (h, m) => format!("Available again in {}h {}m.", h, m),
    }
}

/// Gate the start of a conversation: fail inside the cooldown, otherwise
/// append a usage marker. Read-then-write; two simultaneous starts may both
/// pass, which only costs one extra conversation.
pub async fn begin_conversation(
    store: &dyn LogStore,
    config: &Config,
    user_id: Uuid,
    feature: FeatureType,
) -> AppResult<()> {
    let last_used = store.last_usage(user_id, feature).await?;
    if let Some(remaining) = remaining_secs(last_used, Utc::now(), cooldown_secs(feature, config)) {
        tracing::info!(
            user_id = %user_id,
            feature = feature.as_str(),
            remaining_secs = remaining,
            "Conversation start refused during cooldown"
        );
        return Err(AppError::Cooldown {
            message: cooldown_message(remaining),
            remaining_secs: remaining,
        });
    }

    store.record_usage(user_id, feature).await?;
    Ok(())
}
