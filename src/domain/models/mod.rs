pub mod auth;
pub mod catalog;
pub mod group;
pub mod project;
pub mod role;
pub mod spool;
pub mod usage;
pub mod user;
