use crate::{AppState, handlers};
use axum::{
    Router,
    routing::get,
};

/// Public Router Module
///
/// Endpoints that work without a session. The navigation checks live here because an
/// absent or broken session is a valid input for them: the guard answers "go to login"
/// instead of rejecting the request.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Liveness probe for load balancers.
        .route("/health", get(|| async { "ok" }))
        // GET /catalog
        // The static route -> permission table.
        .route("/catalog", get(handlers::get_catalog))
        // GET /navigate?path=...
        // Route Guard decision for a dashboard path.
        .route("/navigate", get(handlers::navigate))
        // GET /navigate/auth
        // Guard for the login-side pages.
        .route("/navigate/auth", get(handlers::navigate_auth_page))
}
