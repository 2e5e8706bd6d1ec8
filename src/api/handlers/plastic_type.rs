use axum::{extract::State, response::IntoResponse, Json};
use crate::state::AppState;
use crate::error::AppError;
use crate::api::dtos::requests::CreatePlasticTypeRequest;
use crate::api::extractors::auth::AuthUser;
use crate::domain::services::permissions::{authorize, Action};
use std::sync::Arc;
use tracing::info;

pub async fn list_plastic_types(
    State(state): State<Arc<AppState>>,
    AuthUser(identity): AuthUser,
) -> Result<impl IntoResponse, AppError> {
    authorize(&identity, Action::ReadCatalog, None)?;
    Ok(Json(state.plastic_type_repo.list().await?))
}

pub async fn create_plastic_type(
    State(state): State<Arc<AppState>>,
    AuthUser(identity): AuthUser,
    Json(payload): Json<CreatePlasticTypeRequest>,
) -> Result<impl IntoResponse, AppError> {
    authorize(&identity, Action::WriteCatalog, None)?;

    let name = payload.name.trim();
    if name.is_empty() {
        return Err(AppError::Validation("Plastic type name must not be empty".into()));
    }
    if state.plastic_type_repo.find_by_name(name).await?.is_some() {
        return Err(AppError::Conflict("Plastic type already exists".into()));
    }

    let created = state.plastic_type_repo.create(name, Some(identity.id())).await?;
    info!("Plastic type created: {}", created.name);
    Ok(Json(created))
}
