use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::project::ProjectRow;
use crate::projects::store::{get_project, list_projects, upsert_project, NewProject};
use crate::state::AppState;

pub const MISSING_PROJECT_FIELDS: &str = "Missing required fields: name, path, settings_module";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct UpsertProjectRequest {
    pub name: Option<String>,
    pub path: Option<String>,
    pub settings_module: Option<String>,
    pub markdown_content: Option<String>,
    pub html_content: Option<String>,
    pub diagram_content: Option<String>,
    pub models_count: Option<i32>,
    pub serializers_count: Option<i32>,
    pub views_count: Option<i32>,
}

impl UpsertProjectRequest {
    /// `name`, `path` and `settings_module` must be non-blank; everything else defaults.
    pub fn into_new_project(self) -> Result<NewProject, AppError> {
        let required = |v: Option<String>| v.filter(|s| !s.trim().is_empty());
        let (Some(name), Some(path), Some(settings_module)) = (
            required(self.name),
            required(self.path),
            required(self.settings_module),
        ) else {
            return Err(AppError::Validation(MISSING_PROJECT_FIELDS.to_string()));
        };

        Ok(NewProject {
            name,
            path,
            settings_module,
            markdown_content: self.markdown_content.unwrap_or_default(),
            html_content: self.html_content.unwrap_or_default(),
            diagram_content: self.diagram_content.unwrap_or_default(),
            models_count: self.models_count.unwrap_or(0),
            serializers_count: self.serializers_count.unwrap_or(0),
            views_count: self.views_count.unwrap_or(0),
        })
    }
}

/// POST /projects
///
/// Creates the project, or updates the existing one with the same path.
pub async fn handle_upsert_project(
    State(state): State<AppState>,
    request: Result<Json<UpsertProjectRequest>, JsonRejection>,
) -> Result<Json<ProjectRow>, AppError> {
    let Json(request) = request?;
    let project = request.into_new_project()?;
    let db = state.require_db()?;
    Ok(Json(upsert_project(db, &project).await?))
}

/// GET /projects
pub async fn handle_list_projects(
    State(state): State<AppState>,
) -> Result<Json<Vec<ProjectRow>>, AppError> {
    let db = state.require_db()?;
    Ok(Json(list_projects(db).await?))
}

/// GET /projects/:id
pub async fn handle_get_project(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<ProjectRow>, AppError> {
    let Path(id) = id?;
    let db = state.require_db()?;
    get_project(db, id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Project not found".to_string()))
}
