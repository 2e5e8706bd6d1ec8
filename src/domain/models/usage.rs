use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// A debit against a spool's remaining weight.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Usage {
    pub id: i64,
    pub spool_id: i64,
    pub project_id: Option<i64>,
    pub group_id: Option<i64>,
    pub user_id: Option<i64>,
    pub amount_used: f64,
    pub purpose: String,
    pub created_at: DateTime<Utc>,
}

pub struct NewUsage {
    pub spool_id: i64,
    pub project_id: Option<i64>,
    pub group_id: Option<i64>,
    pub user_id: Option<i64>,
    pub amount_used: f64,
    pub purpose: String,
    pub created_at: DateTime<Utc>,
}
