use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

/// GateError
///
/// The single error type of the gate. Library operations (config loading, session
/// persistence) return it and handlers convert it into an HTTP response.
///
/// Access denial is NOT an error: the Route Guard reports it as a `GuardOutcome` value.
#[derive(Debug, thiserror::Error)]
pub enum GateError {
    /// A required environment variable is absent for the current runtime environment.
    #[error("missing configuration: {0}")]
    MissingConfig(&'static str),

    /// A configuration value is present but cannot be parsed.
    #[error("invalid configuration for {key}: {value}")]
    InvalidConfig { key: &'static str, value: String },

    #[error("session storage I/O failed: {0}")]
    Storage(#[from] std::io::Error),

    #[error("session storage is corrupt: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The `x-session-id` header is absent or names a session the store does not know.
    #[error("unknown session")]
    UnknownSession,

    /// The session exists but is not complete (flag, actor, access token).
    #[error("session is not authenticated")]
    Unauthenticated,
}

impl GateError {
    pub fn status(&self) -> StatusCode {
        match self {
            GateError::UnknownSession => StatusCode::NOT_FOUND,
            GateError::Unauthenticated => StatusCode::UNAUTHORIZED,
            GateError::MissingConfig(_)
            | GateError::InvalidConfig { .. }
            | GateError::Storage(_)
            | GateError::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for GateError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            // Internal details stay in the logs, the client gets a generic body.
            tracing::error!(error = %self, "request failed");
            return (status, Json(json!({ "error": "internal error" }))).into_response();
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
