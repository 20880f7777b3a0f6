use anyhow::Result;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;

/// Idempotent schema. Applied in order at startup.
const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS projects (
        id                UUID PRIMARY KEY,
        name              TEXT NOT NULL,
        path              TEXT NOT NULL UNIQUE,
        settings_module   TEXT NOT NULL,
        markdown_content  TEXT NOT NULL DEFAULT '',
        html_content      TEXT NOT NULL DEFAULT '',
        diagram_content   TEXT NOT NULL DEFAULT '',
        models_count      INTEGER NOT NULL DEFAULT 0,
        serializers_count INTEGER NOT NULL DEFAULT 0,
        views_count       INTEGER NOT NULL DEFAULT 0,
        created_at        TIMESTAMPTZ NOT NULL DEFAULT now(),
        updated_at        TIMESTAMPTZ NOT NULL DEFAULT now()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS prompt_usage (
        id              UUID PRIMARY KEY,
        project_id      UUID REFERENCES projects (id) ON DELETE SET NULL,
        question        TEXT NOT NULL,
        response_length INTEGER NOT NULL DEFAULT 0,
        model_used      TEXT NOT NULL,
        tokens_used     INTEGER NOT NULL DEFAULT 0,
        ip_address      TEXT,
        created_at      TIMESTAMPTZ NOT NULL DEFAULT now()
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_prompt_usage_created_at ON prompt_usage (created_at)",
    "CREATE INDEX IF NOT EXISTS idx_prompt_usage_project_id ON prompt_usage (project_id)",
];

/// Creates and returns a PostgreSQL connection pool.
pub async fn create_pool(database_url: &str) -> Result<PgPool> {
    info!("Connecting to PostgreSQL...");

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await?;

    info!("PostgreSQL connection pool established");
    Ok(pool)
}

/// Creates the tables and indexes if they do not exist yet.
pub async fn init_schema(pool: &PgPool) -> Result<()> {
    for statement in SCHEMA {
        sqlx::query(statement).execute(pool).await?;
    }
    info!("Database schema ready");
    Ok(())
}
