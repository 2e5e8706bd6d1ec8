use axum::{extract::State, response::IntoResponse, Json};
use crate::state::AppState;
use crate::error::AppError;
use crate::api::dtos::requests::LoginRequest;
use crate::api::extractors::auth::AuthUser;
use crate::domain::models::auth::{AuthResponse, UserProfile};
use crate::domain::services::permissions::{authorize, Action};
use std::sync::Arc;
use tracing::info;

pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let (issued, user) = state.auth_service.login(&payload.username, &payload.password).await?;

    info!("Issued access token for user {} until {}", user.id, issued.expires_at);

    Ok(Json(AuthResponse {
        access_token: issued.token,
        token_type: "bearer".to_string(),
        expires_in: state.token_service.ttl().num_seconds(),
    }))
}

pub async fn me(AuthUser(identity): AuthUser) -> Result<impl IntoResponse, AppError> {
    authorize(&identity, Action::ViewProfile, identity.group_id())?;
    Ok(Json(UserProfile::from(&identity)))
}
