use crate::domain::models::{
    catalog::{Manufacturer, PlasticType}, group::Group, project::Project, role::{Role, RoleRecord},
    spool::{NewSpool, Spool}, usage::{NewUsage, Usage}, user::{NewUser, User},
};
use crate::error::AppError;
use async_trait::async_trait;

/// Produces the label payload for a freshly inserted spool.
pub type LabelMinter = dyn Fn(&Spool) -> Result<String, AppError> + Send + Sync;

#[async_trait]
pub trait RoleRepository: Send + Sync {
    async fn ensure_defaults(&self, roles: &[Role]) -> Result<(), AppError>;
    async fn list(&self) -> Result<Vec<RoleRecord>, AppError>;
}

#[async_trait]
pub trait GroupRepository: Send + Sync {
    async fn create(&self, name: &str) -> Result<Group, AppError>;
    async fn find_by_id(&self, id: i64) -> Result<Option<Group>, AppError>;
    async fn find_by_name(&self, name: &str) -> Result<Option<Group>, AppError>;
    async fn list(&self) -> Result<Vec<Group>, AppError>;
    /// Sets the group flag and every member's `is_active` in one transaction.
    /// Deactivating fails with `ProtectedGroup` if the group holds an admin at that point.
    async fn set_active(&self, id: i64, active: bool) -> Result<Group, AppError>;
    /// Deactivates and detaches members, ungroups owned resources, removes the group.
    /// Fails with `ProtectedGroup`, changing nothing, if the group holds an admin.
    async fn delete(&self, id: i64) -> Result<(), AppError>;
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, user: &NewUser) -> Result<User, AppError>;
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError>;
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, AppError>;
    async fn list_all(&self) -> Result<Vec<User>, AppError>;
    async fn list_group_members(&self, group_id: i64) -> Result<Vec<User>, AppError>;
    async fn update(&self, user: &User) -> Result<User, AppError>;
    async fn set_active(&self, id: i64, active: bool) -> Result<User, AppError>;
}

#[async_trait]
pub trait SpoolRepository: Send + Sync {
    async fn create(&self, spool: &NewSpool, mint_label: &LabelMinter) -> Result<Spool, AppError>;
    async fn find_by_id(&self, id: i64) -> Result<Option<Spool>, AppError>;
    /// `None` lists every spool; `Some(group)` only that group's spools.
    async fn list(&self, group_id: Option<i64>) -> Result<Vec<Spool>, AppError>;
    async fn delete(&self, id: i64) -> Result<(), AppError>;
}

#[async_trait]
pub trait ProjectRepository: Send + Sync {
    async fn create(&self, name: &str, description: Option<&str>, group_id: Option<i64>) -> Result<Project, AppError>;
    async fn find_by_id(&self, id: i64) -> Result<Option<Project>, AppError>;
    async fn find_by_name(&self, group_id: Option<i64>, name: &str) -> Result<Option<Project>, AppError>;
    async fn list(&self, group_id: Option<i64>) -> Result<Vec<Project>, AppError>;
    async fn delete(&self, id: i64) -> Result<(), AppError>;
}

#[async_trait]
pub trait UsageRepository: Send + Sync {
    /// Inserts the usage and debits the spool atomically; fails without side effects
    /// when the spool holds less than `amount_used`.
    async fn record(&self, usage: &NewUsage) -> Result<Usage, AppError>;
    async fn find_by_id(&self, id: i64) -> Result<Option<Usage>, AppError>;
    async fn list(&self, group_id: Option<i64>) -> Result<Vec<Usage>, AppError>;
    /// Removes the usage and credits the amount back to its spool atomically.
    async fn delete(&self, usage: &Usage) -> Result<(), AppError>;
}

#[async_trait]
pub trait PlasticTypeRepository: Send + Sync {
    async fn create(&self, name: &str, created_by: Option<i64>) -> Result<PlasticType, AppError>;
    async fn find_by_id(&self, id: i64) -> Result<Option<PlasticType>, AppError>;
    async fn find_by_name(&self, name: &str) -> Result<Option<PlasticType>, AppError>;
    async fn list(&self) -> Result<Vec<PlasticType>, AppError>;
}

#[async_trait]
pub trait ManufacturerRepository: Send + Sync {
    async fn create(&self, name: &str, info: Option<&str>, empty_spool_weight: f64) -> Result<Manufacturer, AppError>;
    async fn find_by_id(&self, id: i64) -> Result<Option<Manufacturer>, AppError>;
    async fn find_by_name(&self, name: &str) -> Result<Option<Manufacturer>, AppError>;
    async fn list(&self) -> Result<Vec<Manufacturer>, AppError>;
    async fn delete(&self, id: i64) -> Result<(), AppError>;
}
