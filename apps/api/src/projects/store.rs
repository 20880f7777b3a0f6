use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::models::project::ProjectRow;

/// Fields written on create-or-update. `path` is the natural key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProject {
    pub name: String,
    pub path: String,
    pub settings_module: String,
    pub markdown_content: String,
    pub html_content: String,
    pub diagram_content: String,
    pub models_count: i32,
    pub serializers_count: i32,
    pub views_count: i32,
}

/// Inserts the project, or overwrites the row with the same `path` and bumps `updated_at`.
/// An existing row keeps its id and `created_at`.
pub async fn upsert_project(
    pool: &PgPool,
    project: &NewProject,
) -> Result<ProjectRow, sqlx::Error> {
    let row = sqlx::query_as::<_, ProjectRow>(
        r#"
        INSERT INTO projects
            (id, name, path, settings_module, markdown_content, html_content,
             diagram_content, models_count, serializers_count, views_count)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        ON CONFLICT (path) DO UPDATE SET
            name              = EXCLUDED.name,
            settings_module   = EXCLUDED.settings_module,
            markdown_content  = EXCLUDED.markdown_content,
            html_content      = EXCLUDED.html_content,
            diagram_content   = EXCLUDED.diagram_content,
            models_count      = EXCLUDED.models_count,
            serializers_count = EXCLUDED.serializers_count,
            views_count       = EXCLUDED.views_count,
            updated_at        = now()
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(&project.name)
    .bind(&project.path)
    .bind(&project.settings_module)
    .bind(&project.markdown_content)
    .bind(&project.html_content)
    .bind(&project.diagram_content)
    .bind(project.models_count)
    .bind(project.serializers_count)
    .bind(project.views_count)
    .fetch_one(pool)
    .await?;

    info!("Saved project {} ({})", row.id, row.path);
    Ok(row)
}

/// Most recently updated first.
pub async fn list_projects(pool: &PgPool) -> Result<Vec<ProjectRow>, sqlx::Error> {
    sqlx::query_as::<_, ProjectRow>("SELECT * FROM projects ORDER BY updated_at DESC")
        .fetch_all(pool)
        .await
}

pub async fn get_project(pool: &PgPool, id: Uuid) -> Result<Option<ProjectRow>, sqlx::Error> {
    sqlx::query_as::<_, ProjectRow>("SELECT * FROM projects WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}
