use crate::domain::{
    models::{group::Group, user::User},
    ports::GroupRepository,
    services::permissions::ensure_group_unprotected,
};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use tracing::error;

pub struct PostgresGroupRepo {
    pool: PgPool,
}

impl PostgresGroupRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl GroupRepository for PostgresGroupRepo {
    async fn create(&self, name: &str) -> Result<Group, AppError> {
        sqlx::query_as::<_, Group>(
            "INSERT INTO tenant_groups (name, is_active, created_at) VALUES ($1, $2, $3) RETURNING *"
        )
            .bind(name)
            .bind(true)
            .bind(Utc::now())
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Group>, AppError> {
        sqlx::query_as::<_, Group>("SELECT * FROM tenant_groups WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Group>, AppError> {
        sqlx::query_as::<_, Group>("SELECT * FROM tenant_groups WHERE name = $1")
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list(&self) -> Result<Vec<Group>, AppError> {
        sqlx::query_as::<_, Group>("SELECT * FROM tenant_groups ORDER BY name ASC")
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn set_active(&self, id: i64, active: bool) -> Result<Group, AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        if !active {
            // Row lock blocks concurrent inserts or moves of users into this group until commit.
            let locked = sqlx::query("SELECT id FROM tenant_groups WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(AppError::Database)?;
            if locked.is_none() {
                return Err(AppError::NotFound("Group not found".into()));
            }
            let members = sqlx::query_as::<_, User>(
                "SELECT id, username, password_hash, role, group_id, is_active, created_at FROM users WHERE group_id = $1"
            )
                .bind(id)
                .fetch_all(&mut *tx)
                .await
                .map_err(AppError::Database)?;
            ensure_group_unprotected(&members)?;
        }

        let group = sqlx::query_as::<_, Group>("UPDATE tenant_groups SET is_active = $1 WHERE id = $2 RETURNING *")
            .bind(active)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(AppError::Database)?
            .ok_or_else(|| AppError::NotFound("Group not found".into()))?;

        sqlx::query("UPDATE users SET is_active = $1 WHERE group_id = $2")
            .bind(active)
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(AppError::Database)?;

        tx.commit().await.map_err(AppError::Database)?;
        Ok(group)
    }

    async fn delete(&self, id: i64) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        // Row lock blocks concurrent inserts or moves of users into this group until commit.
        let locked = sqlx::query("SELECT id FROM tenant_groups WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(AppError::Database)?;
        if locked.is_none() {
            return Err(AppError::NotFound("Group not found".into()));
        }
        let members = sqlx::query_as::<_, User>(
            "SELECT id, username, password_hash, role, group_id, is_active, created_at FROM users WHERE group_id = $1"
        )
            .bind(id)
            .fetch_all(&mut *tx)
            .await
            .map_err(AppError::Database)?;
        ensure_group_unprotected(&members)?;

        sqlx::query("UPDATE users SET is_active = $1, group_id = NULL WHERE group_id = $2")
            .bind(false)
            .bind(id)
            .execute(&mut *tx).await.map_err(AppError::Database)?;
        for statement in [
            "UPDATE usages SET group_id = NULL WHERE group_id = $1",
            "UPDATE spools SET group_id = NULL WHERE group_id = $1",
            "UPDATE projects SET group_id = NULL WHERE group_id = $1",
        ] {
            sqlx::query(statement)
                .bind(id)
                .execute(&mut *tx).await.map_err(AppError::Database)?;
        }

        let result = sqlx::query("DELETE FROM tenant_groups WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                error!("Postgres Group Deletion Failed: {:?}", e);
                AppError::Database(e)
            })?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Group not found".into()));
        }

        tx.commit().await.map_err(AppError::Database)?;
        Ok(())
    }
}
