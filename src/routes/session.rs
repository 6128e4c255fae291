use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post, put},
};

/// Session Router Module
///
/// `POST /session` creates a session. Lifecycle routes take `SessionContext` and answer 404
/// for an unknown session id.
/// The remaining routes take `AuthenticatedSession`, which rejects anything but a complete
/// session with 401 before the handler runs.
pub fn session_routes() -> Router<AppState> {
    Router::<AppState>::new()
        // --- Lifecycle ---
        // PUT /session/tokens
        // Stores refreshed tokens.
        .route("/session/tokens", put(handlers::update_tokens))
        // PUT /session/setup-step
        .route("/session/setup-step", put(handlers::update_setup_step))
        // POST /session/setup-complete
        .route("/session/setup-complete", post(handlers::complete_setup))
        // PUT /session/verify-email
        // Transient, never persisted.
        .route("/session/verify-email", put(handlers::set_verify_email))
        // POST /session
        // Login hand-off: posts the login result, needs no session, returns the new id.
        // GET/DELETE /session
        // Header profile data, and logout. Complete session required.
        .route(
            "/session",
            post(handlers::establish_session)
                .get(handlers::get_session)
                .delete(handlers::end_session),
        )
        // --- Complete session required ---
        // POST /access/check
        // Resolver decision for an arbitrary path.
        .route("/access/check", post(handlers::check_access))
        // GET /menu
        // Sidebar filtered by the actor's permissions.
        .route("/menu", get(handlers::get_menu))
}
