use serde::Deserialize;

use crate::domain::models::role::Role;

#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct CreateGroupRequest {
    pub name: String,
}

#[derive(Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub password: String,
    pub role: Option<Role>,
    pub group_id: Option<i64>,
}

#[derive(Deserialize)]
pub struct UpdateUserRequest {
    pub password: Option<String>,
    pub role: Option<Role>,
    pub group_id: Option<i64>,
}

#[derive(Deserialize)]
pub struct CreateSpoolRequest {
    pub plastic_type_id: i64,
    pub manufacturer_id: Option<i64>,
    pub color: String,
    pub weight_total: f64,
    /// Honoured for admins only; everyone else creates in their own group.
    pub group_id: Option<i64>,
}

#[derive(Deserialize)]
pub struct CreateProjectRequest {
    pub name: String,
    pub description: Option<String>,
    pub group_id: Option<i64>,
}

#[derive(Deserialize)]
pub struct CreateUsageRequest {
    pub spool_id: i64,
    pub project_id: Option<i64>,
    pub amount_used: f64,
    pub purpose: Option<String>,
}

#[derive(Deserialize)]
pub struct CreatePlasticTypeRequest {
    pub name: String,
}

#[derive(Deserialize)]
pub struct CreateManufacturerRequest {
    pub name: String,
    pub info: Option<String>,
    pub empty_spool_weight: Option<f64>,
}

#[derive(Deserialize)]
pub struct DecodeQrRequest {
    pub qr: String,
}

/// Optional `?group_id=` narrowing for admin listings.
#[derive(Deserialize, Default)]
pub struct GroupFilter {
    pub group_id: Option<i64>,
}
