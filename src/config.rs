use std::{env, net::SocketAddr, path::PathBuf};

use crate::error::GateError;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";

/// AppConfig
///
/// Holds the gate's entire configuration state. It is loaded once at startup, consumed by
/// `main` to pick the log format, the session store and the listen address.
#[derive(Clone, Debug)]
pub struct AppConfig {
    // Runtime environment marker. Controls the log format and persistence requirements.
    pub env: Env,
    // Socket address the HTTP server binds to.
    pub bind_addr: SocketAddr,
    // JSON file the sessions are persisted to. `None` keeps sessions in memory only.
    pub session_file: Option<PathBuf>,
}

/// Env
///
/// Defines the runtime context: local development (pretty logs, in-memory sessions allowed)
/// or production (JSON logs, persisted sessions mandatory).
#[derive(Clone, PartialEq, Debug)]
pub enum Env {
    Local,
    Production,
}

impl AppConfig {
    /// load
    ///
    /// Reads every parameter from environment variables and fails fast when a value
    /// required for the current environment is missing or malformed.
    ///
    /// * `APP_ENV`: `production` selects `Env::Production`, anything else `Env::Local`.
    /// * `BIND_ADDR`: defaults to `0.0.0.0:3000`.
    /// * `SESSION_FILE`: optional locally, mandatory in production.
    pub fn load() -> Result<Self, GateError> {
        let env = match env::var("APP_ENV").as_deref() {
            Ok("production") => Env::Production,
            _ => Env::Local,
        };

        let raw_addr = env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = raw_addr.parse().map_err(|_| GateError::InvalidConfig {
            key: "BIND_ADDR",
            value: raw_addr.clone(),
        })?;

        let session_file = env::var("SESSION_FILE")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from);

        // Production sessions must survive restarts.
        if env == Env::Production && session_file.is_none() {
            return Err(GateError::MissingConfig("SESSION_FILE"));
        }

        Ok(Self {
            env,
            bind_addr,
            session_file,
        })
    }
}
