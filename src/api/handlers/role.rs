use axum::{extract::State, response::IntoResponse, Json};
use crate::state::AppState;
use crate::error::AppError;
use crate::api::extractors::auth::AuthUser;
use crate::domain::services::permissions::{authorize, Action};
use std::sync::Arc;

pub async fn list_roles(
    State(state): State<Arc<AppState>>,
    AuthUser(identity): AuthUser,
) -> Result<impl IntoResponse, AppError> {
    authorize(&identity, Action::ListRoles, identity.group_id())?;
    let roles = state.role_repo.list().await?;
    Ok(Json(roles))
}
