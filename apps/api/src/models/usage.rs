use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// One answered chat request. The documentation itself is never stored.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PromptUsageRow {
    pub id: Uuid,
    pub project_id: Option<Uuid>,
    pub question: String,
    pub response_length: i32,
    pub model_used: String,
    pub tokens_used: i32,
    pub ip_address: Option<String>,
    pub created_at: DateTime<Utc>,
}
