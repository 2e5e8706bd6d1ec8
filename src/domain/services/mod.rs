pub mod auth_service;
pub mod bootstrap;
pub mod permissions;
pub mod qr_codec;
pub mod token_service;
