use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Spool {
    pub id: i64,
    pub plastic_type_id: i64,
    pub manufacturer_id: Option<i64>,
    pub color: String,
    pub weight_total: f64,
    pub weight_remaining: f64,
    pub qr_payload: Option<String>,
    pub group_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

pub struct NewSpool {
    pub plastic_type_id: i64,
    pub manufacturer_id: Option<i64>,
    pub color: String,
    pub weight_total: f64,
    pub group_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}
