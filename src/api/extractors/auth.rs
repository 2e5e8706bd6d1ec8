use axum::{
    extract::{FromRequestParts, FromRef},
    http::{header::AUTHORIZATION, request::Parts},
};
use crate::state::AppState;
use crate::domain::models::auth::Identity;
use crate::error::AppError;
use std::sync::Arc;
use tracing::Span;

/// The caller behind the `Authorization: Bearer` header, resolved to an active identity.
pub struct AuthUser(pub Identity);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    Arc<AppState>: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let header = parts.headers.get(AUTHORIZATION)
            .ok_or(AppError::InvalidToken)?
            .to_str()
            .map_err(|_| AppError::InvalidToken)?;

        let token = header.strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(AppError::InvalidToken)?;

        let app_state = <Arc<AppState> as FromRef<S>>::from_ref(state);
        let identity = app_state.auth_service.authenticate(token).await?;

        Span::current().record("user_id", identity.id());
        if let Some(group_id) = identity.group_id() {
            Span::current().record("group_id", group_id);
        }

        Ok(AuthUser(identity))
    }
}
