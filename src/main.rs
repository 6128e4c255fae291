use kormat_admin_gate::{
    AppState, FileSessionStore, GateError, InMemorySessionStore, SessionState,
    config::{AppConfig, Env},
    create_router,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// main
///
/// Entry point: configuration, logging, session store, HTTP server.
#[tokio::main]
async fn main() -> Result<(), GateError> {
    // 1. Configuration (fail-fast)
    dotenv::dotenv().ok();
    let config = AppConfig::load()?;

    // 2. Logging: RUST_LOG wins, otherwise sensible local defaults.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "kormat_admin_gate=debug,tower_http=info".into());

    match config.env {
        Env::Local => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
        Env::Production => {
            // JSON lines for the log aggregator.
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
    }

    tracing::info!("Gate starting in {:?} mode", config.env);

    // 3. Session Store: persisted when a file is configured, in memory otherwise.
    let sessions: SessionState = match &config.session_file {
        Some(path) => Arc::new(FileSessionStore::open(path).await?),
        None => {
            tracing::warn!("SESSION_FILE not set, sessions will not survive a restart");
            Arc::new(InMemorySessionStore::new())
        }
    };

    // 4. Router and Server Startup
    let bind_addr = config.bind_addr;
    let app = create_router(AppState { sessions });

    let listener = TcpListener::bind(bind_addr).await?;
    tracing::info!("Listening on {}", bind_addr);
    tracing::info!("API Documentation (Swagger UI) available at /swagger-ui");

    axum::serve(listener, app).await?;
    Ok(())
}
