use crate::api::envelope::{PageQuery, Reply};
use crate::api::extract::{parse_body, parse_id, parse_query, AuthenticatedAccount};
use crate::api::handlers::description;
use crate::api::AppState;
use crate::domain::model::{NewProject, ProjectChanges};
use crate::domain::ports::EntityKind;
use crate::utils::error::Result;
use crate::utils::validation;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;

pub const MIN_NAME_LENGTH: usize = 2;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ProjectPayload {
    pub name: Option<String>,
    pub description: Option<String>,
}

impl ProjectPayload {
    fn into_changes(self) -> Result<ProjectChanges> {
        let name = validation::validate_required_field("name", &self.name)?.trim().to_string();
        validation::validate_non_empty_string("name", &name)?;
        validation::validate_min_length("name", &name, MIN_NAME_LENGTH)?;
        Ok(ProjectChanges {
            name,
            description: description(self.description)?,
        })
    }
}

/// `POST /api/project`: the caller becomes the owner.
pub async fn create(
    State(state): State<AppState>,
    AuthenticatedAccount(account_id): AuthenticatedAccount,
    payload: std::result::Result<Json<ProjectPayload>, JsonRejection>,
) -> Result<Reply> {
    let changes = parse_body(payload)?.into_changes()?;
    let project = state
        .repository
        .create_project(&NewProject {
            name: changes.name,
            description: changes.description,
            owner_id: account_id,
        })
        .await?;

    tracing::info!(project_id = project.id, account_id, "📁 Project created");
    Reply::created("Project created successfully", &project)
}

/// `GET /api/project`: only the caller's projects.
pub async fn list(
    State(state): State<AppState>,
    AuthenticatedAccount(account_id): AuthenticatedAccount,
    page: std::result::Result<Query<PageQuery>, QueryRejection>,
) -> Result<Reply> {
    let page = parse_query(page)?;
    let projects = state.repository.projects_owned_by(account_id).await?;
    Reply::page("Projects retrieved successfully", projects, &page)
}

pub async fn get(
    State(state): State<AppState>,
    AuthenticatedAccount(account_id): AuthenticatedAccount,
    Path(id): Path<String>,
) -> Result<Reply> {
    let project = state.authorizer.require_project(parse_id(&id)?, account_id).await?;
    Reply::ok("Project retrieved successfully", &project)
}

pub async fn update(
    State(state): State<AppState>,
    AuthenticatedAccount(account_id): AuthenticatedAccount,
    Path(id): Path<String>,
    payload: std::result::Result<Json<ProjectPayload>, JsonRejection>,
) -> Result<Reply> {
    let id = parse_id(&id)?;
    let changes = parse_body(payload)?.into_changes()?;
    state.authorizer.require_project(id, account_id).await?;

    let project = state.repository.update_project(id, &changes).await?;
    Reply::ok("Project updated successfully", &project)
}

/// Cascades to the project's URL configs, statuses and response models.
pub async fn delete(
    State(state): State<AppState>,
    AuthenticatedAccount(account_id): AuthenticatedAccount,
    Path(id): Path<String>,
) -> Result<Reply> {
    let id = parse_id(&id)?;
    state.authorizer.require_project(id, account_id).await?;
    state.repository.delete(EntityKind::Project, id).await?;

    tracing::info!(project_id = id, account_id, "🗑️ Project deleted");
    Ok(Reply::message("Project deleted successfully"))
}
