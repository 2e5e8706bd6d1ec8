use crate::domain::{models::role::{Role, RoleRecord}, ports::RoleRepository};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::SqlitePool;

pub struct SqliteRoleRepo { pool: SqlitePool }
impl SqliteRoleRepo { pub fn new(pool: SqlitePool) -> Self { Self { pool } } }

#[async_trait]
impl RoleRepository for SqliteRoleRepo {
    async fn ensure_defaults(&self, roles: &[Role]) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;
        for role in roles {
            sqlx::query("INSERT INTO roles (name) VALUES (?) ON CONFLICT(name) DO NOTHING")
                .bind(role.as_str())
                .execute(&mut *tx).await.map_err(AppError::Database)?;
        }
        tx.commit().await.map_err(AppError::Database)?;
        Ok(())
    }

    async fn list(&self) -> Result<Vec<RoleRecord>, AppError> {
        sqlx::query_as::<_, RoleRecord>("SELECT id, name FROM roles ORDER BY id ASC")
            .fetch_all(&self.pool).await.map_err(AppError::Database)
    }
}
