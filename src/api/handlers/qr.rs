use axum::{extract::State, response::IntoResponse, Json};
use crate::state::AppState;
use crate::error::AppError;
use crate::api::dtos::{requests::DecodeQrRequest, responses::DecodedQrResponse};
use crate::api::extractors::auth::AuthUser;
use crate::api::handlers::spool::load_readable;
use std::sync::Arc;
use tracing::debug;

/// Verifies a scanned label and returns the spool it points at, provided the
/// caller may see that spool.
pub async fn decode_qr(
    State(state): State<Arc<AppState>>,
    AuthUser(identity): AuthUser,
    Json(payload): Json<DecodeQrRequest>,
) -> Result<impl IntoResponse, AppError> {
    let spool_id = state.qr_codec.resolve(&payload.qr)?;
    let spool = load_readable(&state, &identity, spool_id).await?;

    debug!("QR label resolved to spool {}", spool.id);
    Ok(Json(DecodedQrResponse { id: spool.id }))
}
