use std::sync::Arc;
use crate::domain::{
    models::{auth::Identity, group::Group, user::User},
    ports::{GroupRepository, UserRepository},
    services::token_service::{IssuedToken, TokenService},
};
use crate::error::AppError;
use argon2::{password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString}, Argon2};
use chrono::{DateTime, Utc};
use rand::rngs::OsRng;
use tracing::{debug, info, warn};

/// Verified against when the username is unknown so both login failures cost one
/// argon2 run with the default parameters.
const UNKNOWN_USER_HASH: &str =
    "$argon2id$v=19$m=19456,t=2,p=1$UYDNtO+cimINu0yP5bTwiQ$yeWXPegQQfNC8c0Fl3aER71j6/MvYc4XIwGc7H36cgY";

pub struct AuthService {
    user_repo: Arc<dyn UserRepository>,
    group_repo: Arc<dyn GroupRepository>,
    tokens: Arc<TokenService>,
}

impl AuthService {
    pub fn new(user_repo: Arc<dyn UserRepository>, group_repo: Arc<dyn GroupRepository>, tokens: Arc<TokenService>) -> Self {
        Self { user_repo, group_repo, tokens }
    }

    /// Password login. Unknown usernames, wrong passwords and deactivated accounts all
    /// report `InvalidCredentials`; a blocked group is only disclosed once the password matched.
    pub async fn login(&self, username: &str, password: &str) -> Result<(IssuedToken, User), AppError> {
        let Some(user) = self.user_repo.find_by_username(username).await? else {
            verify_password(password, UNKNOWN_USER_HASH)?;
            return Err(AppError::InvalidCredentials);
        };

        if !verify_password(password, &user.password_hash)? {
            return Err(AppError::InvalidCredentials);
        }

        self.active_group(&user).await?;

        if !user.is_active {
            return Err(AppError::InvalidCredentials);
        }

        let issued = self.tokens.issue(&user.username)?;
        info!("User logged in: {}", user.id);
        Ok((issued, user))
    }

    pub async fn authenticate(&self, token: &str) -> Result<Identity, AppError> {
        self.authenticate_at(token, Utc::now()).await
    }

    pub async fn authenticate_at(&self, token: &str, now: DateTime<Utc>) -> Result<Identity, AppError> {
        let subject = self.tokens.verify_at(token, now).map_err(|e| {
            debug!("Token rejected: {}", e);
            AppError::from(e)
        })?;

        let user = self.user_repo.find_by_username(&subject).await?
            .ok_or(AppError::UnknownOrInactiveIdentity)?;

        let group = self.active_group(&user).await?;

        if !user.is_active {
            return Err(AppError::UnknownOrInactiveIdentity);
        }

        let role = user.role()?;
        Ok(Identity { user, role, group })
    }

    async fn active_group(&self, user: &User) -> Result<Option<Group>, AppError> {
        let Some(group_id) = user.group_id else {
            return Ok(None);
        };

        let group = self.group_repo.find_by_id(group_id).await?;
        if let Some(g) = &group {
            if !g.is_active {
                warn!("Rejected user {} of blocked group {}", user.id, g.id);
                return Err(AppError::GroupBlocked);
            }
        }
        Ok(group)
    }
}

pub fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|_| AppError::Internal)
}

pub fn verify_password(password: &str, password_hash: &str) -> Result<bool, AppError> {
    let parsed_hash = PasswordHash::new(password_hash)
        .map_err(|_| AppError::Internal)?;

    Ok(Argon2::default().verify_password(password.as_bytes(), &parsed_hash).is_ok())
}
