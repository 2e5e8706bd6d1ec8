use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;

use crate::domain::models::role::Role;
use crate::error::AppError;

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct User {
    pub id: i64,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: String,
    pub group_id: Option<i64>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn role(&self) -> Result<Role, AppError> {
        self.role.parse().map_err(|_| {
            AppError::InternalWithMsg(format!("User {} has unknown role '{}'", self.id, self.role))
        })
    }
}

pub struct NewUser {
    pub username: String,
    pub password_hash: String,
    pub role: Role,
    pub group_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

impl NewUser {
    pub fn new(username: String, password_hash: String, role: Role, group_id: Option<i64>) -> Self {
        Self {
            username,
            password_hash,
            role,
            group_id,
            created_at: Utc::now(),
        }
    }
}
