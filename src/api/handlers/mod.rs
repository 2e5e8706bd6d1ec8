pub mod auth;
pub mod group;
pub mod health;
pub mod manufacturer;
pub mod plastic_type;
pub mod project;
pub mod qr;
pub mod role;
pub mod spool;
pub mod usage;
pub mod user;

use crate::domain::models::auth::Identity;
use crate::domain::services::permissions::{authorize, Action};
use crate::error::AppError;

/// Group whose inventory a listing covers: admins see everything (or the filtered
/// group), everyone else only their own group.
pub(crate) fn inventory_scope(caller: &Identity, requested: Option<i64>) -> Result<Option<i64>, AppError> {
    if caller.is_admin() {
        return Ok(requested);
    }
    authorize(caller, Action::ReadInventory, caller.group_id())?;
    Ok(caller.group_id())
}

/// Owning group for a newly created resource.
pub(crate) fn owning_group(caller: &Identity, requested: Option<i64>) -> Option<i64> {
    if caller.is_admin() { requested } else { caller.group_id() }
}
