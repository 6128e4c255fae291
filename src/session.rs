use std::{collections::HashMap, path::PathBuf, sync::Arc};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{error::GateError, models::Actor};

/// Step the account-setup wizard starts on for a fresh session.
pub const INITIAL_SETUP_STEP: u8 = 2;

/// Session
///
/// The authentication state of one dashboard client: the actor, its tokens, and the
/// account-setup progress. It is a plain value; every consumer receives it explicitly and
/// changes are written back through a `SessionStore`.
///
/// Serialization is the persisted form: `verify_email` and `updated_at` are transient and
/// never stored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub user: Option<Actor>,
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub is_authenticated: bool,
    pub account_setup_complete: bool,
    pub current_setup_step: u8,
    #[serde(skip)]
    pub verify_email: String,
    #[serde(skip, default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            user: None,
            access_token: None,
            refresh_token: None,
            is_authenticated: false,
            account_setup_complete: false,
            current_setup_step: INITIAL_SETUP_STEP,
            verify_email: String::new(),
            updated_at: Utc::now(),
        }
    }
}

impl Session {
    /// The state right after a successful login.
    pub fn established(user: Actor, access_token: String, refresh_token: Option<String>) -> Self {
        let mut session = Session::default();
        session.update_user_and_auth(Some(user), true);
        session.set_access_token(access_token);
        if let Some(refresh_token) = refresh_token {
            session.set_refresh_token(refresh_token);
        }
        session
    }

    /// is_complete
    ///
    /// A session is valid only when the flag, the actor and a non-empty access token are
    /// ALL present. Any partial state counts as unauthenticated.
    pub fn is_complete(&self) -> bool {
        self.is_authenticated
            && self.user.is_some()
            && self.access_token.as_deref().is_some_and(|t| !t.is_empty())
    }

    pub fn actor(&self) -> Option<&Actor> {
        self.user.as_ref()
    }

    pub fn update_user_and_auth(&mut self, user: Option<Actor>, is_authenticated: bool) {
        self.user = user;
        self.is_authenticated = is_authenticated;
        self.touch();
    }

    pub fn set_access_token(&mut self, token: String) {
        self.access_token = Some(token);
        self.touch();
    }

    pub fn set_refresh_token(&mut self, token: String) {
        self.refresh_token = Some(token);
        self.touch();
    }

    pub fn set_tokens(&mut self, access_token: String, refresh_token: String) {
        self.access_token = Some(access_token);
        self.refresh_token = Some(refresh_token);
        self.touch();
    }

    pub fn update_setup_step(&mut self, step: u8) {
        self.current_setup_step = step;
        self.touch();
    }

    pub fn complete_setup(&mut self) {
        self.account_setup_complete = true;
        self.touch();
    }

    pub fn set_verify_email(&mut self, email: String) {
        self.verify_email = email;
        self.touch();
    }

    /// logout
    ///
    /// Clears every auth-related field. The setup step drops to 0 (not the initial step) and
    /// the pending verification email survives.
    pub fn logout(&mut self) {
        self.user = None;
        self.is_authenticated = false;
        self.account_setup_complete = false;
        self.current_setup_step = 0;
        self.access_token = None;
        self.refresh_token = None;
        self.touch();
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

// 1. SessionStore Contract
/// SessionStore
///
/// The injected accessor for session state. Handlers and the Route Guard only see this
/// trait, so the backing store (memory, JSON file) can be swapped without touching them.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Returns the stored session, or `None` for an unknown id.
    async fn load(&self, id: Uuid) -> Option<Session>;

    /// Inserts or replaces the session under `id`.
    async fn save(&self, id: Uuid, session: Session) -> Result<(), GateError>;

    /// Forgets the session. Returns whether it existed.
    async fn remove(&self, id: Uuid) -> Result<bool, GateError>;

    /// Applies `mutate` to the stored session while holding the store's write lock and
    /// returns the new value. `None` means the id is unknown and nothing was written.
    async fn update(&self, id: Uuid, mutate: SessionMutation) -> Result<Option<Session>, GateError>;
}

/// A change applied in place by `SessionStore::update`.
pub type SessionMutation = Box<dyn FnOnce(&mut Session) + Send>;

/// SessionState
///
/// The concrete type used to share the session store across the application state.
pub type SessionState = Arc<dyn SessionStore>;

// 2. In-Memory Implementation
/// InMemorySessionStore
///
/// Keeps sessions for the lifetime of the process. Used locally and in tests.
#[derive(Default)]
pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<Uuid, Session>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn load(&self, id: Uuid) -> Option<Session> {
        self.sessions.read().await.get(&id).cloned()
    }

    async fn save(&self, id: Uuid, session: Session) -> Result<(), GateError> {
        self.sessions.write().await.insert(id, session);
        Ok(())
    }

    async fn remove(&self, id: Uuid) -> Result<bool, GateError> {
        Ok(self.sessions.write().await.remove(&id).is_some())
    }

    async fn update(&self, id: Uuid, mutate: SessionMutation) -> Result<Option<Session>, GateError> {
        let mut sessions = self.sessions.write().await;
        Ok(sessions.get_mut(&id).map(|session| {
            mutate(session);
            session.clone()
        }))
    }
}

// 3. Persisted Implementation
/// FileSessionStore
///
/// Persists every session into a single JSON document (`{ "<uuid>": { ...session } }`) that
/// is rewritten after each mutation and read back on startup. Only the persisted fields of
/// `Session` reach the disk.
pub struct FileSessionStore {
    path: PathBuf,
    sessions: RwLock<HashMap<Uuid, Session>>,
}

impl FileSessionStore {
    /// open
    ///
    /// Loads the existing document, or starts empty when the file does not exist yet.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, GateError> {
        let path = path.into();
        let sessions: HashMap<Uuid, Session> = match tokio::fs::read(&path).await {
            Ok(bytes) if bytes.is_empty() => HashMap::new(),
            Ok(bytes) => serde_json::from_slice(&bytes)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => return Err(e.into()),
        };
        tracing::info!(path = %path.display(), sessions = sessions.len(), "session file loaded");
        Ok(Self {
            path,
            sessions: RwLock::new(sessions),
        })
    }

    // Callers hold the write lock, so concurrent writers never interleave.
    async fn flush(&self, sessions: &HashMap<Uuid, Session>) -> Result<(), GateError> {
        let bytes = serde_json::to_vec_pretty(sessions)?;
        let tmp = self.path.with_extension("tmp");
        tokio::fs::write(&tmp, bytes).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl SessionStore for FileSessionStore {
    async fn load(&self, id: Uuid) -> Option<Session> {
        self.sessions.read().await.get(&id).cloned()
    }

    async fn save(&self, id: Uuid, session: Session) -> Result<(), GateError> {
        let mut sessions = self.sessions.write().await;
        sessions.insert(id, session);
        self.flush(&sessions).await
    }

    async fn remove(&self, id: Uuid) -> Result<bool, GateError> {
        let mut sessions = self.sessions.write().await;
        let existed = sessions.remove(&id).is_some();
        if existed {
            self.flush(&sessions).await?;
        }
        Ok(existed)
    }

    async fn update(&self, id: Uuid, mutate: SessionMutation) -> Result<Option<Session>, GateError> {
        let mut sessions = self.sessions.write().await;
        let Some(session) = sessions.get_mut(&id) else {
            return Ok(None);
        };
        mutate(session);
        let updated = session.clone();
        self.flush(&sessions).await?;
        Ok(Some(updated))
    }
}
