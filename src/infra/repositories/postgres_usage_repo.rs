use crate::domain::{models::usage::{NewUsage, Usage}, ports::UsageRepository};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::PgPool;

pub struct PostgresUsageRepo {
    pool: PgPool,
}

impl PostgresUsageRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UsageRepository for PostgresUsageRepo {
    async fn record(&self, usage: &NewUsage) -> Result<Usage, AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        let debit = sqlx::query(
            "UPDATE spools SET weight_remaining = weight_remaining - $1 WHERE id = $2 AND weight_remaining >= $3"
        )
            .bind(usage.amount_used)
            .bind(usage.spool_id)
            .bind(usage.amount_used)
            .execute(&mut *tx)
            .await
            .map_err(AppError::Database)?;

        if debit.rows_affected() == 0 {
            return Err(AppError::Validation("Not enough filament left on spool".into()));
        }

        let created = sqlx::query_as::<_, Usage>(
            "INSERT INTO usages (spool_id, project_id, group_id, user_id, amount_used, purpose, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING *"
        )
            .bind(usage.spool_id)
            .bind(usage.project_id)
            .bind(usage.group_id)
            .bind(usage.user_id)
            .bind(usage.amount_used)
            .bind(&usage.purpose)
            .bind(usage.created_at)
            .fetch_one(&mut *tx)
            .await
            .map_err(AppError::Database)?;

        tx.commit().await.map_err(AppError::Database)?;
        Ok(created)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Usage>, AppError> {
        sqlx::query_as::<_, Usage>("SELECT * FROM usages WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool).await.map_err(AppError::Database)
    }

    async fn list(&self, group_id: Option<i64>) -> Result<Vec<Usage>, AppError> {
        match group_id {
            Some(group_id) => sqlx::query_as::<_, Usage>("SELECT * FROM usages WHERE group_id = $1 ORDER BY created_at DESC")
                .bind(group_id)
                .fetch_all(&self.pool).await.map_err(AppError::Database),
            None => sqlx::query_as::<_, Usage>("SELECT * FROM usages ORDER BY created_at DESC")
                .fetch_all(&self.pool).await.map_err(AppError::Database),
        }
    }

    async fn delete(&self, usage: &Usage) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        let result = sqlx::query("DELETE FROM usages WHERE id = $1")
            .bind(usage.id)
            .execute(&mut *tx)
            .await
            .map_err(AppError::Database)?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Usage not found".into()));
        }

        sqlx::query("UPDATE spools SET weight_remaining = weight_remaining + $1 WHERE id = $2")
            .bind(usage.amount_used)
            .bind(usage.spool_id)
            .execute(&mut *tx)
            .await
            .map_err(AppError::Database)?;

        tx.commit().await.map_err(AppError::Database)?;
        Ok(())
    }
}
