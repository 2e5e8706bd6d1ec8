use axum::{extract::{State, Path, Query}, response::IntoResponse, Json};
use chrono::Utc;
use crate::state::AppState;
use crate::error::AppError;
use crate::api::dtos::{
    requests::{CreateSpoolRequest, GroupFilter},
    responses::{SpoolQrResponse, StatusResponse},
};
use crate::api::extractors::auth::AuthUser;
use crate::api::handlers::{inventory_scope, owning_group};
use crate::domain::models::{auth::Identity, spool::{NewSpool, Spool}};
use crate::domain::services::{
    permissions::{authorize, hide_foreign, Action},
    qr_codec::QrRecord,
};
use std::sync::Arc;
use tracing::info;

pub async fn list_spools(
    State(state): State<Arc<AppState>>,
    AuthUser(identity): AuthUser,
    Query(filter): Query<GroupFilter>,
) -> Result<impl IntoResponse, AppError> {
    let scope = inventory_scope(&identity, filter.group_id)?;
    Ok(Json(state.spool_repo.list(scope).await?))
}

pub async fn create_spool(
    State(state): State<Arc<AppState>>,
    AuthUser(identity): AuthUser,
    Json(payload): Json<CreateSpoolRequest>,
) -> Result<impl IntoResponse, AppError> {
    let group_id = owning_group(&identity, payload.group_id);
    authorize(&identity, Action::WriteInventory, group_id)?;

    let color = payload.color.trim();
    if color.is_empty() {
        return Err(AppError::Validation("Color must not be empty".into()));
    }
    if !payload.weight_total.is_finite() || payload.weight_total <= 0.0 {
        return Err(AppError::Validation("Total weight must be positive".into()));
    }

    let plastic_type = state.plastic_type_repo.find_by_id(payload.plastic_type_id).await?
        .ok_or(AppError::Validation(format!("Plastic type {} does not exist", payload.plastic_type_id)))?;
    if let Some(manufacturer_id) = payload.manufacturer_id {
        if state.manufacturer_repo.find_by_id(manufacturer_id).await?.is_none() {
            return Err(AppError::Validation(format!("Manufacturer {} does not exist", manufacturer_id)));
        }
    }
    let group_name = match group_id {
        Some(id) => Some(
            state.group_repo.find_by_id(id).await?
                .ok_or(AppError::Validation(format!("Group {} does not exist", id)))?
                .name,
        ),
        None => None,
    };

    let spool = NewSpool {
        plastic_type_id: plastic_type.id,
        manufacturer_id: payload.manufacturer_id,
        color: color.to_string(),
        weight_total: payload.weight_total,
        group_id,
        created_at: Utc::now(),
    };

    let codec = state.qr_codec.clone();
    let mint_label = move |spool: &Spool| {
        let record = QrRecord::for_spool(spool, &plastic_type.name, group_name.as_deref());
        codec.encode(&record).map_err(AppError::from)
    };

    let created = state.spool_repo.create(&spool, &mint_label).await?;
    info!("Spool {} created by {} in group {:?}", created.id, identity.id(), created.group_id);
    Ok(Json(created))
}

/// Loads a spool the caller may read; spools of other groups look missing.
pub(crate) async fn load_readable(state: &AppState, caller: &Identity, spool_id: i64) -> Result<Spool, AppError> {
    let spool = state.spool_repo.find_by_id(spool_id).await?
        .ok_or(AppError::NotFound("Spool not found".into()))?;
    hide_foreign(authorize(caller, Action::ReadInventory, spool.group_id), "Spool")?;
    Ok(spool)
}

pub async fn get_spool(
    State(state): State<Arc<AppState>>,
    AuthUser(identity): AuthUser,
    Path(spool_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(load_readable(&state, &identity, spool_id).await?))
}

pub async fn get_spool_qr(
    State(state): State<Arc<AppState>>,
    AuthUser(identity): AuthUser,
    Path(spool_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let spool = load_readable(&state, &identity, spool_id).await?;
    let qr = spool.qr_payload.ok_or(AppError::NotFound("QR code not found".into()))?;
    Ok(Json(SpoolQrResponse { id: spool.id, qr }))
}

pub async fn delete_spool(
    State(state): State<Arc<AppState>>,
    AuthUser(identity): AuthUser,
    Path(spool_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let spool = load_readable(&state, &identity, spool_id).await?;
    authorize(&identity, Action::RemoveInventory, spool.group_id)?;

    state.spool_repo.delete(spool.id).await?;
    info!("Spool {} deleted by {}", spool.id, identity.id());
    Ok(Json(StatusResponse::deleted()))
}
