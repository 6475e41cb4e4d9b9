use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A persisted chat message. Immutable once the store has created it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: i64,
    pub text: String,
    #[serde(rename = "isBot")]
    pub is_bot: bool,
    #[serde(rename = "timestamp")]
    pub created_at: DateTime<Utc>,
}
