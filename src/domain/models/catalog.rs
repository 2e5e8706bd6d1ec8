use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct PlasticType {
    pub id: i64,
    pub name: String,
    pub created_by: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Manufacturer {
    pub id: i64,
    pub name: String,
    pub info: Option<String>,
    pub empty_spool_weight: f64,
}
