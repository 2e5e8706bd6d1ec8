use crate::domain::{
    models::catalog::{Manufacturer, PlasticType},
    ports::{ManufacturerRepository, PlasticTypeRepository},
};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::SqlitePool;

pub struct SqlitePlasticTypeRepo { pool: SqlitePool }
impl SqlitePlasticTypeRepo { pub fn new(pool: SqlitePool) -> Self { Self { pool } } }

#[async_trait]
impl PlasticTypeRepository for SqlitePlasticTypeRepo {
    async fn create(&self, name: &str, created_by: Option<i64>) -> Result<PlasticType, AppError> {
        sqlx::query_as::<_, PlasticType>("INSERT INTO plastic_types (name, created_by) VALUES (?, ?) RETURNING *")
            .bind(name).bind(created_by)
            .fetch_one(&self.pool).await.map_err(AppError::Database)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<PlasticType>, AppError> {
        sqlx::query_as::<_, PlasticType>("SELECT * FROM plastic_types WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool).await.map_err(AppError::Database)
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<PlasticType>, AppError> {
        sqlx::query_as::<_, PlasticType>("SELECT * FROM plastic_types WHERE name = ?")
            .bind(name)
            .fetch_optional(&self.pool).await.map_err(AppError::Database)
    }

    async fn list(&self) -> Result<Vec<PlasticType>, AppError> {
        sqlx::query_as::<_, PlasticType>("SELECT * FROM plastic_types ORDER BY name ASC")
            .fetch_all(&self.pool).await.map_err(AppError::Database)
    }
}

pub struct SqliteManufacturerRepo { pool: SqlitePool }
impl SqliteManufacturerRepo { pub fn new(pool: SqlitePool) -> Self { Self { pool } } }

#[async_trait]
impl ManufacturerRepository for SqliteManufacturerRepo {
    async fn create(&self, name: &str, info: Option<&str>, empty_spool_weight: f64) -> Result<Manufacturer, AppError> {
        sqlx::query_as::<_, Manufacturer>(
            "INSERT INTO manufacturers (name, info, empty_spool_weight) VALUES (?, ?, ?) RETURNING *"
        )
            .bind(name).bind(info).bind(empty_spool_weight)
            .fetch_one(&self.pool).await.map_err(AppError::Database)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Manufacturer>, AppError> {
        sqlx::query_as::<_, Manufacturer>("SELECT * FROM manufacturers WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool).await.map_err(AppError::Database)
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Manufacturer>, AppError> {
        sqlx::query_as::<_, Manufacturer>("SELECT * FROM manufacturers WHERE name = ?")
            .bind(name)
            .fetch_optional(&self.pool).await.map_err(AppError::Database)
    }

    async fn list(&self) -> Result<Vec<Manufacturer>, AppError> {
        sqlx::query_as::<_, Manufacturer>("SELECT * FROM manufacturers ORDER BY name ASC")
            .fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn delete(&self, id: i64) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM manufacturers WHERE id = ?")
            .bind(id)
            .execute(&self.pool).await.map_err(AppError::Database)?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Manufacturer not found".into()));
        }
        Ok(())
    }
}
