use crate::domain::{models::project::Project, ports::ProjectRepository};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;

pub struct SqliteProjectRepo {
    pool: SqlitePool,
}

impl SqliteProjectRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProjectRepository for SqliteProjectRepo {
    async fn create(&self, name: &str, description: Option<&str>, group_id: Option<i64>) -> Result<Project, AppError> {
        sqlx::query_as::<_, Project>(
            "INSERT INTO projects (name, description, group_id, created_at) VALUES (?, ?, ?, ?) RETURNING *"
        )
            .bind(name)
            .bind(description)
            .bind(group_id)
            .bind(Utc::now())
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Project>, AppError> {
        sqlx::query_as::<_, Project>("SELECT * FROM projects WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool).await.map_err(AppError::Database)
    }

    async fn find_by_name(&self, group_id: Option<i64>, name: &str) -> Result<Option<Project>, AppError> {
        sqlx::query_as::<_, Project>("SELECT * FROM projects WHERE name = ? AND group_id IS ?")
            .bind(name)
            .bind(group_id)
            .fetch_optional(&self.pool).await.map_err(AppError::Database)
    }

    async fn list(&self, group_id: Option<i64>) -> Result<Vec<Project>, AppError> {
        match group_id {
            Some(group_id) => sqlx::query_as::<_, Project>("SELECT * FROM projects WHERE group_id = ? ORDER BY name ASC")
                .bind(group_id)
                .fetch_all(&self.pool).await.map_err(AppError::Database),
            None => sqlx::query_as::<_, Project>("SELECT * FROM projects ORDER BY name ASC")
                .fetch_all(&self.pool).await.map_err(AppError::Database),
        }
    }

    async fn delete(&self, id: i64) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM projects WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Project not found".into()));
        }
        Ok(())
    }
}
