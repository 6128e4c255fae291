use crate::{
    AppState,
    auth::{AuthenticatedSession, SessionContext},
    catalog,
    error::GateError,
    guard::{self, AuthPageOutcome, GuardOutcome},
    menu::{self, MenuEntry},
    models::{
        AccessCheckRequest, CatalogEntry, EstablishSessionRequest, NavigateQuery,
        SessionCreated, SessionSnapshot, SetupStepRequest, UpdateTokensRequest,
        VerifyEmailRequest, ViewGrant,
    },
    permissions::user_permissions,
    resolver::{self, AccessDecision},
    session::Session,
};
use axum::{
    Json,
    extract::{Query, State},
    http::{StatusCode, Uri},
};
use uuid::Uuid;

// --- Public Handlers ---

/// get_catalog
///
/// [Public Route] Lists the permission catalog: every dashboard route prefix with its
/// requirement. The table is static, so no session is needed.
#[utoipa::path(
    get,
    path = "/catalog",
    responses((status = 200, description = "Permission catalog", body = [CatalogEntry]))
)]
pub async fn get_catalog() -> Json<Vec<CatalogEntry>> {
    Json(catalog::entries())
}

/// establish_session
///
/// [Public Route] Turns a successful login result into a complete session and returns its id.
/// The client sends that id back in the `x-session-id` header from then on.
#[utoipa::path(
    post,
    path = "/session",
    request_body = EstablishSessionRequest,
    responses((status = 201, description = "Session established", body = SessionCreated))
)]
pub async fn establish_session(
    State(state): State<AppState>,
    Json(payload): Json<EstablishSessionRequest>,
) -> Result<(StatusCode, Json<SessionCreated>), GateError> {
    let EstablishSessionRequest {
        token,
        refresh_token,
        user,
    } = payload;

    let session_id = Uuid::new_v4();
    let session = Session::established(user, token, refresh_token);
    let complete = session.is_complete();
    state.sessions.save(session_id, session).await?;

    tracing::info!(%session_id, complete, "session established");
    Ok((StatusCode::CREATED, Json(SessionCreated { session_id })))
}

/// navigate
///
/// [Public Route] Runs the Route Guard for a navigation inside the dashboard and returns the
/// outcome. An incomplete stored session is discarded as a side effect.
#[utoipa::path(
    get,
    path = "/navigate",
    params(NavigateQuery),
    responses((status = 200, description = "Guard outcome", body = GuardOutcome))
)]
pub async fn navigate(
    State(state): State<AppState>,
    SessionContext { id, session }: SessionContext,
    Query(query): Query<NavigateQuery>,
) -> Result<Json<GuardOutcome>, GateError> {
    let outcome = guard::enforce(state.sessions.as_ref(), id, &session, &query.path).await?;
    Ok(Json(outcome))
}

/// navigate_auth_page
///
/// [Public Route] Guard for the login-side pages: signed-in users are sent to the dashboard,
/// inconsistent sessions are cleared.
#[utoipa::path(
    get,
    path = "/navigate/auth",
    responses((status = 200, description = "Auth page outcome", body = AuthPageOutcome))
)]
pub async fn navigate_auth_page(
    State(state): State<AppState>,
    SessionContext { id, session }: SessionContext,
) -> Result<Json<AuthPageOutcome>, GateError> {
    let outcome = guard::enforce_auth_page(state.sessions.as_ref(), id, &session).await?;
    Ok(Json(outcome))
}

/// view_dashboard
///
/// [Guarded Route] Reached only after the route guard middleware let the navigation through.
#[utoipa::path(
    get,
    path = "/dashboard",
    responses(
        (status = 200, description = "View granted", body = ViewGrant),
        (status = 303, description = "Redirect to /login or /dashboard")
    )
)]
pub async fn view_dashboard(uri: Uri) -> Json<ViewGrant> {
    let path = uri.path().to_string();
    let route = catalog::resolve(&path).route;
    Json(ViewGrant { path, route })
}

// --- Session Lifecycle Handlers (known session required) ---

/// update_tokens
///
/// Stores the result of a token refresh. Without a new refresh token only the access
/// token is replaced.
#[utoipa::path(
    put,
    path = "/session/tokens",
    request_body = UpdateTokensRequest,
    responses(
        (status = 204, description = "Tokens updated"),
        (status = 404, description = "Unknown session")
    )
)]
pub async fn update_tokens(
    State(state): State<AppState>,
    SessionContext { id, .. }: SessionContext,
    Json(payload): Json<UpdateTokensRequest>,
) -> Result<StatusCode, GateError> {
    let UpdateTokensRequest {
        access_token,
        refresh_token,
    } = payload;
    mutate_session(&state, id, move |session| match refresh_token {
        Some(refresh_token) => session.set_tokens(access_token, refresh_token),
        None => session.set_access_token(access_token),
    })
    .await
}

#[utoipa::path(
    put,
    path = "/session/setup-step",
    request_body = SetupStepRequest,
    responses((status = 204, description = "Step updated"), (status = 404, description = "Unknown session"))
)]
pub async fn update_setup_step(
    State(state): State<AppState>,
    SessionContext { id, .. }: SessionContext,
    Json(payload): Json<SetupStepRequest>,
) -> Result<StatusCode, GateError> {
    mutate_session(&state, id, move |session| {
        session.update_setup_step(payload.step)
    })
    .await
}

#[utoipa::path(
    post,
    path = "/session/setup-complete",
    responses((status = 204, description = "Setup completed"), (status = 404, description = "Unknown session"))
)]
pub async fn complete_setup(
    State(state): State<AppState>,
    SessionContext { id, .. }: SessionContext,
) -> Result<StatusCode, GateError> {
    mutate_session(&state, id, Session::complete_setup).await
}

/// set_verify_email
///
/// Remembers the address an OTP was sent to. Kept in memory only, never persisted.
#[utoipa::path(
    put,
    path = "/session/verify-email",
    request_body = VerifyEmailRequest,
    responses((status = 204, description = "Email stored"), (status = 404, description = "Unknown session"))
)]
pub async fn set_verify_email(
    State(state): State<AppState>,
    SessionContext { id, .. }: SessionContext,
    Json(payload): Json<VerifyEmailRequest>,
) -> Result<StatusCode, GateError> {
    mutate_session(&state, id, move |session| {
        session.set_verify_email(payload.email)
    })
    .await
}

/// Runs one lifecycle change against the stored session, atomically with respect to other
/// writers. An id the store no longer knows (for example after a logout) is rejected.
async fn mutate_session(
    state: &AppState,
    id: Option<Uuid>,
    mutate: impl FnOnce(&mut Session) + Send + 'static,
) -> Result<StatusCode, GateError> {
    let id = id.ok_or(GateError::UnknownSession)?;
    state
        .sessions
        .update(id, Box::new(mutate))
        .await?
        .ok_or(GateError::UnknownSession)?;
    Ok(StatusCode::NO_CONTENT)
}

// --- Authenticated Handlers ---

/// get_session
///
/// [Authenticated Route] Profile data for the dashboard header. Tokens are not returned.
#[utoipa::path(
    get,
    path = "/session",
    responses(
        (status = 200, description = "Current session", body = SessionSnapshot),
        (status = 401, description = "No complete session")
    )
)]
pub async fn get_session(
    AuthenticatedSession { id, session, actor }: AuthenticatedSession,
) -> Json<SessionSnapshot> {
    Json(SessionSnapshot {
        session_id: id,
        display_name: actor.display_name().to_string(),
        initials: actor.initials(),
        avatar: actor.avatar().map(str::to_string),
        email: actor.email.clone(),
        permissions: user_permissions(Some(&actor))
            .iter()
            .map(ToString::to_string)
            .collect(),
        has_refresh_token: session.refresh_token.is_some(),
        account_setup_complete: session.account_setup_complete,
        current_setup_step: session.current_setup_step,
        verify_email: session.verify_email.clone(),
        updated_at: session.updated_at,
    })
}

/// end_session
///
/// [Authenticated Route] Logout: the session record is dropped, so the id can never
/// authenticate again.
#[utoipa::path(
    delete,
    path = "/session",
    responses((status = 204, description = "Logged out"), (status = 401, description = "No complete session"))
)]
pub async fn end_session(
    State(state): State<AppState>,
    AuthenticatedSession { id, .. }: AuthenticatedSession,
) -> Result<StatusCode, GateError> {
    state.sessions.remove(id).await?;
    tracing::info!(session_id = %id, "logged out");
    Ok(StatusCode::NO_CONTENT)
}

/// check_access
///
/// [Authenticated Route] Resolves whether the session's actor may view a path.
#[utoipa::path(
    post,
    path = "/access/check",
    request_body = AccessCheckRequest,
    responses(
        (status = 200, description = "Access decision", body = AccessDecision),
        (status = 401, description = "No complete session")
    )
)]
pub async fn check_access(
    AuthenticatedSession { actor, .. }: AuthenticatedSession,
    Json(payload): Json<AccessCheckRequest>,
) -> Json<AccessDecision> {
    Json(resolver::check_access(Some(&actor), &payload.path))
}

/// get_menu
///
/// [Authenticated Route] The sidebar entries the session's actor may see.
#[utoipa::path(
    get,
    path = "/menu",
    responses(
        (status = 200, description = "Visible sidebar entries", body = [MenuEntry]),
        (status = 401, description = "No complete session")
    )
)]
pub async fn get_menu(
    AuthenticatedSession { actor, .. }: AuthenticatedSession,
) -> Json<Vec<MenuEntry>> {
    Json(menu::visible_menu(Some(&actor)))
}
