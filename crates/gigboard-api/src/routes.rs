//! API routes.

use axum::middleware;
use axum::routing::{get, patch};
use axum::Router;
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;

use crate::handlers::{
    create_gig, current_user, delete_gig, get_gig, health, list_gigs, ready, search_gigs,
    update_gig, update_gig_status,
};
use crate::metrics::metrics_middleware;
use crate::middleware::{cors_layer, request_id, request_logging, security_headers};
use crate::state::AppState;
use crate::ws::ws_gigs;

/// Create the API router.
pub fn create_router(state: AppState, metrics_handle: Option<PrometheusHandle>) -> Router {
    let gig_routes = Router::new()
        .route("/gigs", get(list_gigs).post(create_gig))
        .route("/gigs/search", get(search_gigs))
        .route(
            "/gigs/:id",
            get(get_gig).put(update_gig).delete(delete_gig),
        )
        .route("/gigs/:id/status", patch(update_gig_status));

    let auth_routes = Router::new().route("/auth/me", get(current_user));

    let api_routes = Router::new().merge(gig_routes).merge(auth_routes);

    let ws_routes = Router::new().route("/ws/gigs", get(ws_gigs));

    let health_routes = Router::new()
        .route("/health", get(health))
        .route("/healthz", get(health))
        .route("/ready", get(ready));

    // Metrics endpoint (if enabled)
    let metrics_routes = if let Some(handle) = metrics_handle {
        Router::new().route("/metrics", get(move || async move { handle.render() }))
    } else {
        Router::new()
    };

    Router::new()
        .nest("/api", api_routes)
        .merge(ws_routes)
        .merge(health_routes)
        .merge(metrics_routes)
        .layer(RequestBodyLimitLayer::new(state.config.max_body_size))
        .layer(TimeoutLayer::new(state.config.request_timeout))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(middleware::from_fn(security_headers))
        .layer(middleware::from_fn(request_id))
        .layer(middleware::from_fn(request_logging))
        .layer(cors_layer(&state.config.cors_origins))
        .with_state(state)
}
