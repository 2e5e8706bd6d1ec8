use axum::{
    body::Body,
    extract::Request,
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use crate::state::AppState;
use crate::api::handlers::{
    auth, group, health, manufacturer, plastic_type, project, qr, role, spool, usage, user,
};
use tower_http::{
    trace::TraceLayer,
    classify::ServerErrorsFailureClass,
};
use tracing::{info_span, Span, error, info};
use uuid::Uuid;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health::health_check))

        // Auth
        .route("/api/v1/auth/login", post(auth::login))
        .route("/api/v1/auth/me", get(auth::me))

        // Administration
        .route("/api/v1/roles", get(role::list_roles))
        .route("/api/v1/groups", get(group::list_groups).post(group::create_group))
        .route("/api/v1/groups/{id}", delete(group::delete_group))
        .route("/api/v1/groups/{id}/block", put(group::block_group))
        .route("/api/v1/groups/{id}/unblock", put(group::unblock_group))
        .route("/api/v1/users", get(user::list_users).post(user::create_user))
        .route("/api/v1/users/{id}", put(user::update_user))
        .route("/api/v1/users/{id}/block", put(user::block_user))
        .route("/api/v1/users/{id}/unblock", put(user::unblock_user))

        // Inventory
        .route("/api/v1/spools", get(spool::list_spools).post(spool::create_spool))
        .route("/api/v1/spools/{id}", get(spool::get_spool).delete(spool::delete_spool))
        .route("/api/v1/spools/{id}/qr", get(spool::get_spool_qr))
        .route("/api/v1/qr/decode", post(qr::decode_qr))
        .route("/api/v1/projects", get(project::list_projects).post(project::create_project))
        .route("/api/v1/projects/{id}", delete(project::delete_project))
        .route("/api/v1/usages", get(usage::list_usages).post(usage::create_usage))
        .route("/api/v1/usages/{id}", delete(usage::delete_usage))

        // Catalog
        .route("/api/v1/plastic-types", get(plastic_type::list_plastic_types).post(plastic_type::create_plastic_type))
        .route("/api/v1/manufacturers", get(manufacturer::list_manufacturers).post(manufacturer::create_manufacturer))
        .route("/api/v1/manufacturers/{id}", get(manufacturer::get_manufacturer).delete(manufacturer::delete_manufacturer))

        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<Body>| {
                    let request_id = Uuid::new_v4().to_string();
                    info_span!(
                        "http_request",
                        request_id = %request_id,
                        method = ?request.method(),
                        uri = ?request.uri(),
                        version = ?request.version(),
                        user_id = tracing::field::Empty,
                        group_id = tracing::field::Empty,
                    )
                })
                .on_request(|request: &Request<Body>, _span: &Span| {
                    info!("started processing request: {} {}", request.method(), request.uri().path());
                })
                .on_response(|response: &axum::http::Response<Body>, latency: Duration, _span: &Span| {
                    info!(
                        status = response.status().as_u16(),
                        latency_ms = latency.as_millis(),
                        "finished processing request"
                    );
                })
                .on_failure(|error: ServerErrorsFailureClass, _latency: Duration, _span: &Span| {
                    error!("request failed: {:?}", error);
                })
        )
        .with_state(state)
}
