use axum::{extract::{State, Path}, response::IntoResponse, Json};
use crate::state::AppState;
use crate::error::AppError;
use crate::api::dtos::requests::{CreateUserRequest, UpdateUserRequest};
use crate::api::extractors::auth::AuthUser;
use crate::domain::models::{auth::Identity, role::Role, user::{NewUser, User}};
use crate::domain::services::{
    auth_service::hash_password,
    permissions::{authorize, hide_foreign, Action},
};
use std::sync::Arc;
use tracing::info;

pub async fn list_users(
    State(state): State<Arc<AppState>>,
    AuthUser(identity): AuthUser,
) -> Result<impl IntoResponse, AppError> {
    authorize(&identity, Action::ListIdentities, identity.group_id())?;

    let users = match (identity.is_admin(), identity.group_id()) {
        (true, _) => state.user_repo.list_all().await?,
        (false, Some(group_id)) => state.user_repo.list_group_members(group_id).await?,
        (false, None) => Vec::new(),
    };
    Ok(Json(users))
}

pub async fn create_user(
    State(state): State<Arc<AppState>>,
    AuthUser(identity): AuthUser,
    Json(payload): Json<CreateUserRequest>,
) -> Result<impl IntoResponse, AppError> {
    let role = payload.role.unwrap_or(Role::User);
    let group_id = if identity.is_admin() { payload.group_id } else { identity.group_id() };

    authorize(&identity, Action::ManageIdentity { role, target: None }, group_id)?;

    let username = payload.username.trim();
    if username.is_empty() {
        return Err(AppError::Validation("Username must not be empty".into()));
    }
    if payload.password.is_empty() {
        return Err(AppError::Validation("Password must not be empty".into()));
    }
    if let Some(group_id) = group_id {
        ensure_group_exists(&state, group_id).await?;
    }
    if state.user_repo.find_by_username(username).await?.is_some() {
        return Err(AppError::Conflict("Username already exists".into()));
    }

    let user = NewUser::new(username.to_string(), hash_password(&payload.password)?, role, group_id);
    let created = state.user_repo.create(&user).await?;

    info!("User {} created by {} with role {}", created.id, identity.id(), role);
    Ok(Json(created))
}

pub async fn update_user(
    State(state): State<Arc<AppState>>,
    AuthUser(identity): AuthUser,
    Path(user_id): Path<i64>,
    Json(payload): Json<UpdateUserRequest>,
) -> Result<impl IntoResponse, AppError> {
    let mut target = load_managed(&state, &identity, user_id).await?;

    if let Some(role) = payload.role {
        authorize(&identity, Action::ManageIdentity { role, target: Some(user_id) }, target.group_id)?;
        target.role = role.as_str().to_string();
    }

    if let Some(group_id) = payload.group_id {
        let role = target.role()?;
        authorize(&identity, Action::ManageIdentity { role, target: Some(user_id) }, Some(group_id))?;
        ensure_group_exists(&state, group_id).await?;
        target.group_id = Some(group_id);
    }

    if let Some(password) = payload.password {
        if password.is_empty() {
            return Err(AppError::Validation("Password must not be empty".into()));
        }
        target.password_hash = hash_password(&password)?;
    }

    let updated = state.user_repo.update(&target).await?;
    info!("User {} updated by {}", updated.id, identity.id());
    Ok(Json(updated))
}

pub async fn block_user(
    State(state): State<Arc<AppState>>,
    AuthUser(identity): AuthUser,
    Path(user_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    load_managed(&state, &identity, user_id).await?;
    let user = state.user_repo.set_active(user_id, false).await?;
    info!("User {} deactivated by {}", user.id, identity.id());
    Ok(Json(user))
}

pub async fn unblock_user(
    State(state): State<Arc<AppState>>,
    AuthUser(identity): AuthUser,
    Path(user_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    load_managed(&state, &identity, user_id).await?;
    let user = state.user_repo.set_active(user_id, true).await?;
    info!("User {} reactivated by {}", user.id, identity.id());
    Ok(Json(user))
}

/// Loads `user_id` and checks the caller may manage it as it currently stands.
async fn load_managed(state: &AppState, caller: &Identity, user_id: i64) -> Result<User, AppError> {
    let target = state.user_repo.find_by_id(user_id).await?
        .ok_or(AppError::NotFound("User not found".into()))?;

    let action = Action::ManageIdentity { role: target.role()?, target: Some(target.id) };
    hide_foreign(authorize(caller, action, target.group_id), "User")?;
    Ok(target)
}

async fn ensure_group_exists(state: &AppState, group_id: i64) -> Result<(), AppError> {
    state.group_repo.find_by_id(group_id).await?
        .map(|_| ())
        .ok_or(AppError::Validation(format!("Group {} does not exist", group_id)))
}
