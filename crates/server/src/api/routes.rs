use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use super::{contacts, device, dispatch, handlers, quota, runs, ws};
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    // API routes
    let api_routes = Router::new()
        // Health and policy
        .route("/health", get(handlers::health))
        .route("/config", get(handlers::get_config))
        .route("/config", put(handlers::update_config))
        // Contacts
        .route("/contacts", get(contacts::list_contacts))
        .route("/contacts", post(contacts::add_contact))
        .route("/contacts/bulk", post(contacts::bulk_contacts))
        .route("/contacts/import", post(contacts::import_contacts))
        .route("/contacts/export", get(contacts::export_contacts))
        .route("/contacts/{id}", put(contacts::update_contact))
        .route("/contacts/{id}", delete(contacts::delete_contact))
        // Device
        .route("/device/check", get(device::check_device))
        .route("/device/tap", post(device::test_tap))
        .route("/device/screen", get(device::screen_size))
        // Dispatch
        .route("/dispatch/start", post(dispatch::start_dispatch))
        .route("/dispatch/stop", post(dispatch::stop_dispatch))
        .route("/dispatch/status", get(dispatch::dispatch_status))
        // Quota
        .route("/quota", get(quota::get_quota))
        .route("/quota/reset", post(quota::reset_quota))
        // Persisted runs
        .route("/runs", get(runs::list_runs))
        .route("/runs/clear", post(runs::clear_runs))
        .route("/runs/{id}", get(runs::get_run))
        .route("/runs/{id}", delete(runs::delete_run))
        // Live event stream
        .route("/ws", get(ws::ws_handler));

    Router::new()
        .nest("/api/v1", api_routes)
        .route("/metrics", get(handlers::metrics))
        .layer(middleware::from_fn(super::middleware::metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
