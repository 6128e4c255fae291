use std::convert::Infallible;

use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use uuid::Uuid;

use crate::{
    error::GateError,
    models::Actor,
    session::{Session, SessionState},
};

/// Header carrying the client's session identifier.
pub const SESSION_HEADER: &str = "x-session-id";

/// SessionContext Extractor Result
///
/// The session a request belongs to, whatever its state. `id` is set only when the header
/// names a session the store knows; otherwise `session` is a fresh, unauthenticated value.
///
/// Never rejects: deciding what an incomplete session means is the Route Guard's job.
#[derive(Debug, Clone)]
pub struct SessionContext {
    pub id: Option<Uuid>,
    pub session: Session,
}

impl<S> FromRequestParts<S> for SessionContext
where
    S: Send + Sync,
    // Allows the extractor to pull the session store from the app state.
    SessionState: FromRef<S>,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let store = SessionState::from_ref(state);

        // 1. Header Extraction: a missing or malformed id is treated as "no session".
        let Some(id) = session_id(parts) else {
            return Ok(SessionContext {
                id: None,
                session: Session::default(),
            });
        };

        // 2. Store Lookup
        match store.load(id).await {
            Some(session) => Ok(SessionContext {
                id: Some(id),
                session,
            }),
            None => {
                tracing::debug!(session_id = %id, "unknown session id");
                Ok(SessionContext {
                    id: None,
                    session: Session::default(),
                })
            }
        }
    }
}

/// AuthenticatedSession Extractor Result
///
/// A stored session that passed the completeness check (flag, actor, access token).
/// Handlers taking this argument can rely on `actor` being present.
///
/// Rejection: `GateError::Unauthenticated` (401) on any failure.
#[derive(Debug, Clone)]
pub struct AuthenticatedSession {
    pub id: Uuid,
    pub session: Session,
    pub actor: Actor,
}

impl<S> FromRequestParts<S> for AuthenticatedSession
where
    S: Send + Sync,
    SessionState: FromRef<S>,
{
    type Rejection = GateError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Ok(SessionContext { id, session }) =
            SessionContext::from_request_parts(parts, state).await;

        let id = id.ok_or(GateError::Unauthenticated)?;
        if !session.is_complete() {
            return Err(GateError::Unauthenticated);
        }
        let actor = session.user.clone().ok_or(GateError::Unauthenticated)?;

        Ok(AuthenticatedSession { id, session, actor })
    }
}

fn session_id(parts: &Parts) -> Option<Uuid> {
    parts
        .headers
        .get(SESSION_HEADER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| Uuid::parse_str(value.trim()).ok())
}
