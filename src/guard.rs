use serde::{Deserialize, Serialize};
use ts_rs::TS;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    catalog::{DASHBOARD_ROOT, RouteId},
    error::GateError,
    resolver,
    session::{Session, SessionStore},
};

pub const LOGIN_PATH: &str = "/login";

pub const PERMISSION_DENIED_NOTICE: &str = "You do not have permission to access this page.";

/// GuardOutcome
///
/// Result of guarding one navigation inside the protected dashboard subtree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[serde(tag = "outcome", rename_all = "snake_case")]
#[ts(export)]
pub enum GuardOutcome {
    /// Show the requested view. `route` is `None` for paths outside the catalog.
    Render { route: Option<RouteId> },
    /// Incomplete session: it has been discarded, go to the login page.
    RedirectToLogin,
    /// Complete session without the permission: tell the user and go to the dashboard root.
    Denied { notice: String },
}

impl GuardOutcome {
    /// Where the client must navigate, or `None` to stay.
    pub fn redirect_target(&self) -> Option<&'static str> {
        match self {
            GuardOutcome::Render { .. } => None,
            GuardOutcome::RedirectToLogin => Some(LOGIN_PATH),
            GuardOutcome::Denied { .. } => Some(DASHBOARD_ROOT),
        }
    }
}

/// evaluate
///
/// Decides one navigation. Authentication is checked before authorization, so a partial
/// session always lands on the login page, never on the permission notice.
pub fn evaluate(session: &Session, path: &str) -> GuardOutcome {
    if !session.is_complete() {
        return GuardOutcome::RedirectToLogin;
    }

    let decision = resolver::check_access(session.actor(), path);
    if decision.allowed {
        GuardOutcome::Render {
            route: decision.route,
        }
    } else {
        GuardOutcome::Denied {
            notice: PERMISSION_DENIED_NOTICE.to_string(),
        }
    }
}

/// enforce
///
/// Evaluates the navigation and applies its side effect: an incomplete session the store
/// knows is logged out by dropping its record, so no stale snapshot can be written back.
pub async fn enforce(
    store: &dyn SessionStore,
    id: Option<Uuid>,
    session: &Session,
    path: &str,
) -> Result<GuardOutcome, GateError> {
    let outcome = evaluate(session, path);

    match &outcome {
        GuardOutcome::RedirectToLogin => {
            if let Some(id) = id {
                if store.remove(id).await? {
                    tracing::info!(session_id = %id, path, "incomplete session cleared");
                }
            }
        }
        GuardOutcome::Denied { .. } => {
            tracing::warn!(session_id = ?id, path, "navigation denied");
        }
        GuardOutcome::Render { route } => {
            tracing::debug!(session_id = ?id, path, ?route, "navigation allowed");
        }
    }

    Ok(outcome)
}

/// AuthPageOutcome
///
/// Result of guarding the login-side pages (`/`, `/login`, password reset, OTP).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[serde(tag = "outcome", rename_all = "snake_case")]
#[ts(export)]
pub enum AuthPageOutcome {
    /// Nobody is signed in: show the page.
    Render,
    /// A complete session exists: skip the page and open the dashboard.
    RedirectToDashboard,
    /// The flag is set but the actor or token is gone: the session was cleared, show the page.
    ClearAndRender,
}

pub fn evaluate_auth_page(session: &Session) -> AuthPageOutcome {
    if session.is_complete() {
        AuthPageOutcome::RedirectToDashboard
    } else if session.is_authenticated {
        AuthPageOutcome::ClearAndRender
    } else {
        AuthPageOutcome::Render
    }
}

/// enforce_auth_page
///
/// Applies `evaluate_auth_page`, dropping the record of an inconsistent session.
pub async fn enforce_auth_page(
    store: &dyn SessionStore,
    id: Option<Uuid>,
    session: &Session,
) -> Result<AuthPageOutcome, GateError> {
    let outcome = evaluate_auth_page(session);
    if outcome == AuthPageOutcome::ClearAndRender {
        if let Some(id) = id {
            if store.remove(id).await? {
                tracing::info!(session_id = %id, "inconsistent session cleared on auth page");
            }
        }
    }
    Ok(outcome)
}
