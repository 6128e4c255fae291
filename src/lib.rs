use axum::{
    Router,
    extract::{FromRef, Request, State},
    http::HeaderName,
    middleware::{self, Next},
    response::{IntoResponse, Redirect, Response},
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

// Access-control core: catalog, permission extraction, resolver, guard.
pub mod catalog;
pub mod guard;
pub mod menu;
pub mod permissions;
pub mod resolver;

// Session state and its HTTP plumbing.
pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod session;

// Module for routing segregation (Public, Session, Dashboard).
pub mod routes;
use auth::SessionContext;
use guard::GuardOutcome;
use routes::{dashboard, public, session as session_routes};

// --- Public Re-exports ---

pub use config::AppConfig;
pub use error::GateError;
pub use resolver::has_access;
pub use session::{
    FileSessionStore, InMemorySessionStore, SessionMutation, SessionState, SessionStore,
};

/// Response header carrying the user-visible notice of a denied navigation.
pub const NOTICE_HEADER: &str = "x-notice";

/// ApiDoc
///
/// Auto-generated OpenAPI document, served at `/api-docs/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::get_catalog, handlers::establish_session, handlers::navigate,
        handlers::navigate_auth_page, handlers::view_dashboard, handlers::update_tokens,
        handlers::update_setup_step, handlers::complete_setup, handlers::set_verify_email,
        handlers::get_session, handlers::end_session, handlers::check_access,
        handlers::get_menu
    ),
    components(
        schemas(
            models::Actor, models::UserDetails, models::Role, models::EstablishSessionRequest,
            models::UpdateTokensRequest, models::SetupStepRequest, models::VerifyEmailRequest,
            models::AccessCheckRequest, models::SessionCreated, models::SessionSnapshot,
            models::CatalogEntry, models::ViewGrant, catalog::RouteId, catalog::RequirementView,
            catalog::RequirementKind, resolver::AccessDecision, guard::GuardOutcome,
            guard::AuthPageOutcome, menu::MenuEntry,
        )
    ),
    tags(
        (name = "kormat-admin-gate", description = "Route access gate for the Kormat admin dashboard")
    )
)]
struct ApiDoc;

/// AppState
///
/// The single container of shared services, cloned into every request.
#[derive(Clone)]
pub struct AppState {
    /// Session accessor, injected so handlers never touch a global store.
    pub sessions: SessionState,
}

impl FromRef<AppState> for SessionState {
    fn from_ref(app_state: &AppState) -> SessionState {
        app_state.sessions.clone()
    }
}

/// route_guard
///
/// Middleware in front of the dashboard subtree. Runs the Route Guard for the request path:
///
/// * incomplete session: dropped from the store, `303` to `/login`;
/// * permission missing: `303` to `/dashboard` with the notice in `x-notice`;
/// * otherwise the request reaches the handler.
async fn route_guard(
    State(state): State<AppState>,
    SessionContext { id, session }: SessionContext,
    request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();
    let outcome = match guard::enforce(state.sessions.as_ref(), id, &session, &path).await {
        Ok(outcome) => outcome,
        Err(e) => return e.into_response(),
    };

    match outcome {
        GuardOutcome::Render { .. } => next.run(request).await,
        GuardOutcome::RedirectToLogin => Redirect::to(guard::LOGIN_PATH).into_response(),
        GuardOutcome::Denied { notice } => (
            [(HeaderName::from_static(NOTICE_HEADER), notice)],
            Redirect::to(catalog::DASHBOARD_ROOT),
        )
            .into_response(),
    }
}

/// create_router
///
/// Assembles the routing structure, applies the scoped and global middleware, and
/// registers the application state.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    let x_request_id = HeaderName::from_static("x-request-id");

    let base_router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(public::public_routes())
        .merge(session_routes::session_routes())
        // Dashboard navigations pass the Route Guard before any handler runs.
        .merge(
            dashboard::dashboard_routes().route_layer(middleware::from_fn_with_state(
                state.clone(),
                route_guard,
            )),
        )
        .with_state(state);

    // Observability: request id generation, a tracing span per request, id propagation.
    base_router
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        .layer(cors)
}

/// trace_span_logger
///
/// Builds the per-request span, tagged with the `x-request-id` set by `SetRequestIdLayer`.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
