pub mod sqlite_catalog_repo;
pub mod sqlite_group_repo;
pub mod sqlite_project_repo;
pub mod sqlite_role_repo;
pub mod sqlite_spool_repo;
pub mod sqlite_usage_repo;
pub mod sqlite_user_repo;

pub mod postgres_catalog_repo;
pub mod postgres_group_repo;
pub mod postgres_project_repo;
pub mod postgres_role_repo;
pub mod postgres_spool_repo;
pub mod postgres_usage_repo;
pub mod postgres_user_repo;
