use axum::{extract::{State, Path}, response::IntoResponse, Json};
use crate::state::AppState;
use crate::error::AppError;
use crate::api::dtos::{requests::CreateManufacturerRequest, responses::StatusResponse};
use crate::api::extractors::auth::AuthUser;
use crate::domain::services::permissions::{authorize, Action};
use std::sync::Arc;
use tracing::info;

pub async fn list_manufacturers(
    State(state): State<Arc<AppState>>,
    AuthUser(identity): AuthUser,
) -> Result<impl IntoResponse, AppError> {
    authorize(&identity, Action::ReadCatalog, None)?;
    Ok(Json(state.manufacturer_repo.list().await?))
}

pub async fn create_manufacturer(
    State(state): State<Arc<AppState>>,
    AuthUser(identity): AuthUser,
    Json(payload): Json<CreateManufacturerRequest>,
) -> Result<impl IntoResponse, AppError> {
    authorize(&identity, Action::WriteCatalog, None)?;

    let name = payload.name.trim();
    if name.is_empty() {
        return Err(AppError::Validation("Manufacturer name must not be empty".into()));
    }
    let empty_spool_weight = payload.empty_spool_weight.unwrap_or(0.0);
    if !empty_spool_weight.is_finite() || empty_spool_weight < 0.0 {
        return Err(AppError::Validation("Empty spool weight must not be negative".into()));
    }
    if state.manufacturer_repo.find_by_name(name).await?.is_some() {
        return Err(AppError::Conflict("Manufacturer already exists".into()));
    }

    let created = state.manufacturer_repo.create(name, payload.info.as_deref(), empty_spool_weight).await?;
    info!("Manufacturer created: {}", created.name);
    Ok(Json(created))
}

pub async fn get_manufacturer(
    State(state): State<Arc<AppState>>,
    AuthUser(identity): AuthUser,
    Path(manufacturer_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    authorize(&identity, Action::ReadCatalog, None)?;
    let manufacturer = state.manufacturer_repo.find_by_id(manufacturer_id).await?
        .ok_or(AppError::NotFound("Manufacturer not found".into()))?;
    Ok(Json(manufacturer))
}

pub async fn delete_manufacturer(
    State(state): State<Arc<AppState>>,
    AuthUser(identity): AuthUser,
    Path(manufacturer_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    authorize(&identity, Action::RemoveCatalog, None)?;
    state.manufacturer_repo.delete(manufacturer_id).await?;
    info!("Manufacturer {} deleted", manufacturer_id);
    Ok(Json(StatusResponse::deleted()))
}
