use axum::{extract::{State, Path}, response::IntoResponse, Json};
use crate::state::AppState;
use crate::error::AppError;
use crate::api::dtos::{requests::CreateGroupRequest, responses::StatusResponse};
use crate::api::extractors::auth::AuthUser;
use crate::domain::models::group::Group;
use crate::domain::services::permissions::{authorize, Action};
use std::sync::Arc;
use tracing::info;

pub async fn list_groups(
    State(state): State<Arc<AppState>>,
    AuthUser(identity): AuthUser,
) -> Result<impl IntoResponse, AppError> {
    authorize(&identity, Action::ListGroups, None)?;
    Ok(Json(state.group_repo.list().await?))
}

pub async fn create_group(
    State(state): State<Arc<AppState>>,
    AuthUser(identity): AuthUser,
    Json(payload): Json<CreateGroupRequest>,
) -> Result<impl IntoResponse, AppError> {
    authorize(&identity, Action::CreateGroup, None)?;

    let name = payload.name.trim();
    if name.is_empty() {
        return Err(AppError::Validation("Group name must not be empty".into()));
    }
    if state.group_repo.find_by_name(name).await?.is_some() {
        return Err(AppError::Conflict("Group already exists".into()));
    }

    let created = state.group_repo.create(name).await?;
    info!("Group created: {} ({})", created.name, created.id);
    Ok(Json(created))
}

async fn load_group(state: &AppState, id: i64) -> Result<Group, AppError> {
    state.group_repo.find_by_id(id).await?
        .ok_or(AppError::NotFound("Group not found".into()))
}

pub async fn block_group(
    State(state): State<Arc<AppState>>,
    AuthUser(identity): AuthUser,
    Path(group_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    authorize(&identity, Action::BlockGroup, Some(group_id))?;
    load_group(&state, group_id).await?;

    let group = state.group_repo.set_active(group_id, false).await?;
    info!("Group {} blocked, members deactivated", group.id);
    Ok(Json(group))
}

pub async fn unblock_group(
    State(state): State<Arc<AppState>>,
    AuthUser(identity): AuthUser,
    Path(group_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    authorize(&identity, Action::UnblockGroup, Some(group_id))?;
    load_group(&state, group_id).await?;

    let group = state.group_repo.set_active(group_id, true).await?;
    info!("Group {} unblocked", group.id);
    Ok(Json(group))
}

pub async fn delete_group(
    State(state): State<Arc<AppState>>,
    AuthUser(identity): AuthUser,
    Path(group_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    authorize(&identity, Action::DeleteGroup, Some(group_id))?;
    load_group(&state, group_id).await?;

    state.group_repo.delete(group_id).await?;
    info!("Group {} deleted, members detached", group_id);
    Ok(Json(StatusResponse::deleted()))
}
