use serde::Serialize;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::models::usage::PromptUsageRow;

/// Written after every answered chat request.
#[derive(Debug, Clone)]
pub struct NewPromptUsage<'a> {
    pub project_id: Option<Uuid>,
    pub question: &'a str,
    pub response_length: i32,
    pub model_used: &'a str,
    pub tokens_used: i32,
    pub ip_address: Option<&'a str>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ModelCount {
    pub model: String,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct UsageStats {
    pub total_prompts: i64,
    pub total_tokens: i64,
    pub prompts_today: i64,
    pub prompts_this_week: i64,
    pub prompts_this_month: i64,
    pub top_models: Vec<ModelCount>,
}

/// Number of entries in `UsageStats::top_models`.
const TOP_MODELS_LIMIT: i64 = 5;

/// A `project_id` naming no stored project is written as NULL.
pub async fn record_prompt_usage(
    pool: &PgPool,
    usage: &NewPromptUsage<'_>,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO prompt_usage
            (id, project_id, question, response_length, model_used, tokens_used, ip_address)
        VALUES ($1, (SELECT id FROM projects WHERE id = $2), $3, $4, $5, $6, $7)
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(usage.project_id)
    .bind(usage.question)
    .bind(usage.response_length)
    .bind(usage.model_used)
    .bind(usage.tokens_used)
    .bind(usage.ip_address)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn usage_stats(pool: &PgPool) -> Result<UsageStats, sqlx::Error> {
    let (total_prompts, total_tokens, prompts_today, prompts_this_week, prompts_this_month): (
        i64,
        i64,
        i64,
        i64,
        i64,
    ) = sqlx::query_as(
        r#"
        SELECT
            COUNT(*),
            COALESCE(SUM(tokens_used), 0)::BIGINT,
            COUNT(*) FILTER (WHERE created_at >= date_trunc('day', now())),
            COUNT(*) FILTER (WHERE created_at >= now() - INTERVAL '7 days'),
            COUNT(*) FILTER (WHERE created_at >= date_trunc('month', now()))
        FROM prompt_usage
        "#,
    )
    .fetch_one(pool)
    .await?;

    let top_models = sqlx::query_as::<_, ModelCount>(
        r#"
        SELECT model_used AS model, COUNT(*) AS count
        FROM prompt_usage
        GROUP BY model_used
        ORDER BY count DESC
        LIMIT $1
        "#,
    )
    .bind(TOP_MODELS_LIMIT)
    .fetch_all(pool)
    .await?;

    Ok(UsageStats {
        total_prompts,
        total_tokens,
        prompts_today,
        prompts_this_week,
        prompts_this_month,
        top_models,
    })
}

/// Newest first.
pub async fn recent_usage(pool: &PgPool, limit: i64) -> Result<Vec<PromptUsageRow>, sqlx::Error> {
    sqlx::query_as::<_, PromptUsageRow>(
        "SELECT * FROM prompt_usage ORDER BY created_at DESC LIMIT $1",
    )
    .bind(limit)
    .fetch_all(pool)
    .await
}
