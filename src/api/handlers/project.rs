use axum::{extract::{State, Path, Query}, response::IntoResponse, Json};
use crate::state::AppState;
use crate::error::AppError;
use crate::api::dtos::{
    requests::{CreateProjectRequest, GroupFilter},
    responses::StatusResponse,
};
use crate::api::extractors::auth::AuthUser;
use crate::api::handlers::{inventory_scope, owning_group};
use crate::domain::services::permissions::{authorize, hide_foreign, Action};
use std::sync::Arc;
use tracing::info;

pub async fn list_projects(
    State(state): State<Arc<AppState>>,
    AuthUser(identity): AuthUser,
    Query(filter): Query<GroupFilter>,
) -> Result<impl IntoResponse, AppError> {
    let scope = inventory_scope(&identity, filter.group_id)?;
    Ok(Json(state.project_repo.list(scope).await?))
}

pub async fn create_project(
    State(state): State<Arc<AppState>>,
    AuthUser(identity): AuthUser,
    Json(payload): Json<CreateProjectRequest>,
) -> Result<impl IntoResponse, AppError> {
    let group_id = owning_group(&identity, payload.group_id);
    authorize(&identity, Action::WriteInventory, group_id)?;

    let name = payload.name.trim();
    if name.is_empty() {
        return Err(AppError::Validation("Project name must not be empty".into()));
    }
    if let Some(id) = group_id {
        if state.group_repo.find_by_id(id).await?.is_none() {
            return Err(AppError::Validation(format!("Group {} does not exist", id)));
        }
    }
    if state.project_repo.find_by_name(group_id, name).await?.is_some() {
        return Err(AppError::Conflict("Project already exists".into()));
    }

    let created = state.project_repo.create(name, payload.description.as_deref(), group_id).await?;
    info!("Project {} created by {} in group {:?}", created.id, identity.id(), created.group_id);
    Ok(Json(created))
}

pub async fn delete_project(
    State(state): State<Arc<AppState>>,
    AuthUser(identity): AuthUser,
    Path(project_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let project = state.project_repo.find_by_id(project_id).await?
        .ok_or(AppError::NotFound("Project not found".into()))?;
    hide_foreign(authorize(&identity, Action::ReadInventory, project.group_id), "Project")?;
    authorize(&identity, Action::RemoveInventory, project.group_id)?;

    state.project_repo.delete(project.id).await?;
    info!("Project {} deleted by {}", project.id, identity.id());
    Ok(Json(StatusResponse::deleted()))
}
