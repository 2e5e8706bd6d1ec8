use axum::{extract::{State, Path, Query}, response::IntoResponse, Json};
use chrono::Utc;
use crate::state::AppState;
use crate::error::AppError;
use crate::api::dtos::{
    requests::{CreateUsageRequest, GroupFilter},
    responses::StatusResponse,
};
use crate::api::extractors::auth::AuthUser;
use crate::api::handlers::inventory_scope;
use crate::domain::models::usage::NewUsage;
use crate::domain::services::permissions::{authorize, hide_foreign, Action};
use std::sync::Arc;
use tracing::info;

pub async fn list_usages(
    State(state): State<Arc<AppState>>,
    AuthUser(identity): AuthUser,
    Query(filter): Query<GroupFilter>,
) -> Result<impl IntoResponse, AppError> {
    let scope = inventory_scope(&identity, filter.group_id)?;
    Ok(Json(state.usage_repo.list(scope).await?))
}

/// Records filament consumption; the spool's group owns the usage.
pub async fn create_usage(
    State(state): State<Arc<AppState>>,
    AuthUser(identity): AuthUser,
    Json(payload): Json<CreateUsageRequest>,
) -> Result<impl IntoResponse, AppError> {
    let spool = state.spool_repo.find_by_id(payload.spool_id).await?
        .ok_or(AppError::NotFound("Spool not found".into()))?;
    hide_foreign(authorize(&identity, Action::WriteInventory, spool.group_id), "Spool")?;

    if !payload.amount_used.is_finite() || payload.amount_used <= 0.0 {
        return Err(AppError::Validation("Amount used must be positive".into()));
    }

    if let Some(project_id) = payload.project_id {
        let project = state.project_repo.find_by_id(project_id).await?
            .ok_or(AppError::NotFound("Project not found".into()))?;
        hide_foreign(authorize(&identity, Action::ReadInventory, project.group_id), "Project")?;
        if project.group_id != spool.group_id {
            return Err(AppError::Validation("Project and spool belong to different groups".into()));
        }
    }

    let usage = NewUsage {
        spool_id: spool.id,
        project_id: payload.project_id,
        group_id: spool.group_id,
        user_id: Some(identity.id()),
        amount_used: payload.amount_used,
        purpose: payload.purpose.unwrap_or_default(),
        created_at: Utc::now(),
    };

    let created = state.usage_repo.record(&usage).await?;
    info!("Usage {} recorded: {}g from spool {} by {}", created.id, created.amount_used, spool.id, identity.id());
    Ok(Json(created))
}

pub async fn delete_usage(
    State(state): State<Arc<AppState>>,
    AuthUser(identity): AuthUser,
    Path(usage_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let usage = state.usage_repo.find_by_id(usage_id).await?
        .ok_or(AppError::NotFound("Usage not found".into()))?;
    hide_foreign(authorize(&identity, Action::WriteInventory, usage.group_id), "Usage")?;

    state.usage_repo.delete(&usage).await?;
    info!("Usage {} deleted by {}, {}g returned to spool {}", usage.id, identity.id(), usage.amount_used, usage.spool_id);
    Ok(Json(StatusResponse::deleted()))
}
