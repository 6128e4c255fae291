use crate::{AppState, handlers};
use axum::{Router, routing::get};

/// Dashboard Router Module
///
/// Browser navigations into the dashboard subtree. This router must be wrapped in the
/// route guard middleware (see `create_router`): by the time a handler here runs, the
/// session is complete and the resolver has granted the path.
pub fn dashboard_routes() -> Router<AppState> {
    Router::new()
        // GET /dashboard
        // Overview, open to every signed-in actor.
        .route("/dashboard", get(handlers::view_dashboard))
        // GET /dashboard/{*rest}
        // Every other screen, including detail pages such as /dashboard/orders/{id}.
        .route("/dashboard/{*rest}", get(handlers::view_dashboard))
}
