//! API routes

pub mod domains;
pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::{routing::resolve_tenant, state::AppState};

/// Create all API routes
pub fn create_router(state: AppState) -> Router {
    // Health check routes (at root level for infrastructure monitoring)
    let health_routes = Router::new()
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness));

    // Custom domain routes - under /api/v1, tenant from the resolution middleware
    let api_v1_routes = Router::new()
        .route(
            "/domains",
            get(domains::list_domains).post(domains::create_domain),
        )
        .route(
            "/domains/:domain_id",
            get(domains::get_domain)
                .patch(domains::update_domain)
                .delete(domains::delete_domain),
        )
        .route("/domains/:domain_id/verify", post(domains::verify_domain))
        .route(
            "/domains/:domain_id/regenerate-token",
            post(domains::regenerate_token),
        )
        .route("/domains/:domain_id/dns-check", post(domains::check_dns))
        .route("/domains/:domain_id/primary", post(domains::set_primary));

    // Combine all routes
    Router::new()
        .merge(health_routes)
        .nest("/api/v1", api_v1_routes)
        // Every request gets a TenantContext before dispatch
        .layer(middleware::from_fn_with_state(
            state.resolver.clone(),
            resolve_tenant,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(64 * 1024))
        .with_state(state)
}
