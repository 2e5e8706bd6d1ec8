use crate::domain::{models::spool::{NewSpool, Spool}, ports::{LabelMinter, SpoolRepository}};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::PgPool;

pub struct PostgresSpoolRepo {
    pool: PgPool,
}

impl PostgresSpoolRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SpoolRepository for PostgresSpoolRepo {
    async fn create(&self, spool: &NewSpool, mint_label: &LabelMinter) -> Result<Spool, AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        let inserted = sqlx::query_as::<_, Spool>(
            "INSERT INTO spools (plastic_type_id, manufacturer_id, color, weight_total, weight_remaining, qr_payload, group_id, created_at)
             VALUES ($1, $2, $3, $4, $5, NULL, $6, $7)
             RETURNING *"
        )
            .bind(spool.plastic_type_id)
            .bind(spool.manufacturer_id)
            .bind(&spool.color)
            .bind(spool.weight_total)
            .bind(spool.weight_total)
            .bind(spool.group_id)
            .bind(spool.created_at)
            .fetch_one(&mut *tx)
            .await
            .map_err(AppError::Database)?;

        // The label needs the generated id, so it is minted inside the insert transaction.
        let payload = mint_label(&inserted)?;

        let labelled = sqlx::query_as::<_, Spool>("UPDATE spools SET qr_payload = $1 WHERE id = $2 RETURNING *")
            .bind(payload)
            .bind(inserted.id)
            .fetch_one(&mut *tx)
            .await
            .map_err(AppError::Database)?;

        tx.commit().await.map_err(AppError::Database)?;
        Ok(labelled)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Spool>, AppError> {
        sqlx::query_as::<_, Spool>("SELECT * FROM spools WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool).await.map_err(AppError::Database)
    }

    async fn list(&self, group_id: Option<i64>) -> Result<Vec<Spool>, AppError> {
        match group_id {
            Some(group_id) => sqlx::query_as::<_, Spool>("SELECT * FROM spools WHERE group_id = $1 ORDER BY id ASC")
                .bind(group_id)
                .fetch_all(&self.pool).await.map_err(AppError::Database),
            None => sqlx::query_as::<_, Spool>("SELECT * FROM spools ORDER BY id ASC")
                .fetch_all(&self.pool).await.map_err(AppError::Database),
        }
    }

    async fn delete(&self, id: i64) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM spools WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Spool not found".into()));
        }
        Ok(())
    }
}
