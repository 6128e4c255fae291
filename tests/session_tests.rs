use kormat_admin_gate::{
    FileSessionStore, InMemorySessionStore, SessionStore,
    models::{Actor, Role},
    permissions::Permission,
    session::{INITIAL_SETUP_STEP, Session},
};
use uuid::Uuid;

fn staff() -> Actor {
    Actor {
        id: Some("17".to_string()),
        email: Some("ops@kormat.test".to_string()),
        user_details: None,
        roles: Some(vec![Role {
            id: None,
            name: Some("ops".to_string()),
            permissions: Some(vec![Permission::ManageOrders]),
        }]),
    }
}

// --- Session value object ---

#[test]
fn test_fresh_session_is_unauthenticated() {
    let session = Session::default();
    assert!(!session.is_complete());
    assert_eq!(session.current_setup_step, INITIAL_SETUP_STEP);
    assert!(session.actor().is_none());
}

#[test]
fn test_established_session_is_complete() {
    let session = Session::established(staff(), "access".into(), Some("refresh".into()));
    assert!(session.is_complete());
    assert_eq!(session.refresh_token.as_deref(), Some("refresh"));
}

#[test]
fn test_partial_sessions_are_incomplete() {
    // Flag and actor, no token.
    let mut no_token = Session::default();
    no_token.update_user_and_auth(Some(staff()), true);
    assert!(!no_token.is_complete());

    // Empty token counts as missing.
    let mut empty_token = no_token.clone();
    empty_token.set_access_token(String::new());
    assert!(!empty_token.is_complete());

    // Token and actor, flag unset.
    let mut no_flag = Session::default();
    no_flag.update_user_and_auth(Some(staff()), false);
    no_flag.set_access_token("access".into());
    assert!(!no_flag.is_complete());

    // Flag and token, no actor.
    let mut no_actor = Session::default();
    no_actor.update_user_and_auth(None, true);
    no_actor.set_access_token("access".into());
    assert!(!no_actor.is_complete());
}

#[test]
fn test_logout_clears_auth_fields_only() {
    let mut session = Session::established(staff(), "access".into(), Some("refresh".into()));
    session.complete_setup();
    session.set_verify_email("otp@kormat.test".into());

    session.logout();

    assert!(session.user.is_none());
    assert!(session.access_token.is_none());
    assert!(session.refresh_token.is_none());
    assert!(!session.is_authenticated);
    assert!(!session.account_setup_complete);
    assert_eq!(session.current_setup_step, 0);
    assert_eq!(session.verify_email, "otp@kormat.test");
}

#[test]
fn test_token_updates() {
    let mut session = Session::established(staff(), "old".into(), None);
    session.set_tokens("new".into(), "refresh".into());
    assert_eq!(session.access_token.as_deref(), Some("new"));
    assert_eq!(session.refresh_token.as_deref(), Some("refresh"));

    session.set_access_token("newer".into());
    assert_eq!(session.access_token.as_deref(), Some("newer"));
    assert_eq!(session.refresh_token.as_deref(), Some("refresh"));
}

#[test]
fn test_persisted_form_keeps_only_auth_fields() {
    let mut session = Session::established(staff(), "access".into(), None);
    session.set_verify_email("otp@kormat.test".into());
    session.update_setup_step(4);

    let json = serde_json::to_value(&session).unwrap();
    let mut keys: Vec<&str> = json.as_object().unwrap().keys().map(String::as_str).collect();
    keys.sort_unstable();
    assert_eq!(
        keys,
        vec![
            "accessToken",
            "accountSetupComplete",
            "currentSetupStep",
            "isAuthenticated",
            "refreshToken",
            "user",
        ]
    );
    assert!(json.get("verifyEmail").is_none());
    assert!(json.get("updatedAt").is_none());
    assert_eq!(json["isAuthenticated"], true);
    assert_eq!(json["accessToken"], "access");
    assert_eq!(json["currentSetupStep"], 4);
    assert_eq!(json["user"]["roles"][0]["permissions"][0], "manage_orders");

    let restored: Session = serde_json::from_value(json).unwrap();
    assert_eq!(restored.verify_email, "");
    assert!(restored.is_complete());
}

// --- Stores ---

#[tokio::test]
async fn test_in_memory_store_lifecycle() {
    let store = InMemorySessionStore::new();
    let id = Uuid::new_v4();

    assert!(store.load(id).await.is_none());
    store.save(id, Session::established(staff(), "a".into(), None)).await.unwrap();
    assert!(store.load(id).await.unwrap().is_complete());
    assert!(store.remove(id).await.unwrap());
    assert!(!store.remove(id).await.unwrap());
}

#[tokio::test]
async fn test_file_store_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("auth-storage.json");
    let id = Uuid::new_v4();

    {
        let store = FileSessionStore::open(&path).await.unwrap();
        let mut session = Session::established(staff(), "access".into(), Some("refresh".into()));
        session.set_verify_email("otp@kormat.test".into());
        store.save(id, session).await.unwrap();
    }

    let reopened = FileSessionStore::open(&path).await.unwrap();
    let session = reopened.load(id).await.expect("session should be persisted");
    assert!(session.is_complete());
    assert_eq!(session.refresh_token.as_deref(), Some("refresh"));
    assert_eq!(session.verify_email, "");

    assert!(reopened.remove(id).await.unwrap());
    let emptied = FileSessionStore::open(&path).await.unwrap();
    assert!(emptied.load(id).await.is_none());
}

#[tokio::test]
async fn test_update_mutates_in_place_and_skips_unknown_ids() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("auth-storage.json");
    let id = Uuid::new_v4();

    let store = FileSessionStore::open(&path).await.unwrap();
    store
        .save(id, Session::established(staff(), "access".into(), None))
        .await
        .unwrap();

    let updated = store
        .update(id, Box::new(|session: &mut Session| {
            session.set_access_token("rotated".into())
        }))
        .await
        .unwrap()
        .expect("known id should be updated");
    assert_eq!(updated.access_token.as_deref(), Some("rotated"));

    let missing = Uuid::new_v4();
    assert!(store
        .update(missing, Box::new(Session::complete_setup))
        .await
        .unwrap()
        .is_none());
    assert!(store.load(missing).await.is_none());

    let reopened = FileSessionStore::open(&path).await.unwrap();
    let session = reopened.load(id).await.unwrap();
    assert_eq!(session.access_token.as_deref(), Some("rotated"));

    let memory = InMemorySessionStore::new();
    assert!(memory
        .update(id, Box::new(Session::logout))
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_file_store_rejects_corrupt_document() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("auth-storage.json");
    tokio::fs::write(&path, b"{ not json").await.unwrap();

    assert!(FileSessionStore::open(&path).await.is_err());
}
