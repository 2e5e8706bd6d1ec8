use std::sync::Arc;
use crate::domain::ports::{
    GroupRepository, ManufacturerRepository, PlasticTypeRepository, ProjectRepository,
    RoleRepository, SpoolRepository, UsageRepository, UserRepository,
};
use crate::domain::services::{auth_service::AuthService, qr_codec::QrCodec, token_service::TokenService};
use crate::config::Config;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub role_repo: Arc<dyn RoleRepository>,
    pub group_repo: Arc<dyn GroupRepository>,
    pub user_repo: Arc<dyn UserRepository>,
    pub spool_repo: Arc<dyn SpoolRepository>,
    pub project_repo: Arc<dyn ProjectRepository>,
    pub usage_repo: Arc<dyn UsageRepository>,
    pub plastic_type_repo: Arc<dyn PlasticTypeRepository>,
    pub manufacturer_repo: Arc<dyn ManufacturerRepository>,
    pub token_service: Arc<TokenService>,
    pub auth_service: Arc<AuthService>,
    pub qr_codec: Arc<QrCodec>,
}
