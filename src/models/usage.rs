use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Rate-limited AI conversation features.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum FeatureType {
    Focus,
    Lounge,
}

impl FeatureType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FeatureType::Focus => "focus",
            FeatureType::Lounge => "lounge",
        }
    }
}

/// Append-only record of a conversation start.
#[derive(Debug, Clone, Serialize)]
pub struct AiUsageMarker {
    pub id: Uuid,
    pub user_id: Uuid,
    pub feature_type: FeatureType,
    pub used_at: DateTime<Utc>,
}
