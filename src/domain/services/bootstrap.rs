use rand::{distributions::Alphanumeric, Rng};
use tracing::{info, warn};

use crate::config::Config;
use crate::domain::{
    models::{role::Role, user::NewUser},
    ports::{RoleRepository, UserRepository},
    services::auth_service::hash_password,
};
use crate::error::AppError;

/// Idempotent: inserts whichever of the fixed roles are missing.
pub async fn ensure_default_roles(roles: &dyn RoleRepository) -> Result<(), AppError> {
    roles.ensure_defaults(&Role::ALL).await?;
    info!("Default roles ensured");
    Ok(())
}

/// Creates the configured administrator when no user of that name exists yet.
/// Returns the generated password when none was configured.
pub async fn ensure_bootstrap_admin(users: &dyn UserRepository, config: &Config) -> Result<Option<String>, AppError> {
    let username = &config.bootstrap_admin_username;
    if users.find_by_username(username).await?.is_some() {
        return Ok(None);
    }

    let (password, generated) = match &config.bootstrap_admin_password {
        Some(p) => (p.clone(), false),
        None => {
            let p: String = rand::thread_rng()
                .sample_iter(&Alphanumeric)
                .take(16)
                .map(char::from)
                .collect();
            (p, true)
        }
    };

    let admin = NewUser::new(username.clone(), hash_password(&password)?, Role::Admin, None);
    let created = users.create(&admin).await?;
    info!("Bootstrap administrator created: {}", created.id);

    if generated {
        warn!("Generated password for bootstrap administrator '{}': {}", username, password);
        return Ok(Some(password));
    }
    Ok(None)
}
