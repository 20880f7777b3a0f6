use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;

use crate::errors::AppError;
use crate::models::usage::PromptUsageRow;
use crate::state::AppState;
use crate::usage::store::{recent_usage, usage_stats, UsageStats};

const DEFAULT_USAGE_LIMIT: i64 = 20;
const MAX_USAGE_LIMIT: i64 = 100;

#[derive(Debug, Default, Deserialize)]
pub struct UsageQuery {
    pub limit: Option<i64>,
}

impl UsageQuery {
    fn effective_limit(&self) -> i64 {
        self.limit
            .unwrap_or(DEFAULT_USAGE_LIMIT)
            .clamp(1, MAX_USAGE_LIMIT)
    }
}

/// GET /stats
pub async fn handle_stats(State(state): State<AppState>) -> Result<Json<UsageStats>, AppError> {
    let db = state.require_db()?;
    Ok(Json(usage_stats(db).await?))
}

/// GET /usage?limit=N
///
/// Most recent answered questions. `limit` is clamped to 1..=100.
pub async fn handle_recent_usage(
    State(state): State<AppState>,
    Query(query): Query<UsageQuery>,
) -> Result<Json<Vec<PromptUsageRow>>, AppError> {
    let db = state.require_db()?;
    Ok(Json(recent_usage(db, query.effective_limit()).await?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usage_limit_defaults_and_clamps() {
        assert_eq!(UsageQuery::default().effective_limit(), 20);
        assert_eq!(UsageQuery { limit: Some(0) }.effective_limit(), 1);
        assert_eq!(UsageQuery { limit: Some(5000) }.effective_limit(), 100);
        assert_eq!(UsageQuery { limit: Some(7) }.effective_limit(), 7);
    }
}
