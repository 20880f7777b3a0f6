use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A documented Django project, keyed by its filesystem path.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ProjectRow {
    pub id: Uuid,
    pub name: String,
    pub path: String,
    pub settings_module: String,
    pub markdown_content: String,
    pub html_content: String,
    pub diagram_content: String,
    pub models_count: i32,
    pub serializers_count: i32,
    pub views_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
