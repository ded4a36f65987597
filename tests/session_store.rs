use chrono::Local;
use convostore::models::SessionFile;
use convostore::session::{FilesystemSession, SessionBackend, SESSION_EXPIRY_MINUTES};
use convostore::{ConversationStore, Role};
use std::collections::BTreeMap;
use std::fs;
use tempfile::TempDir;

fn write_session_file(dir: &std::path::Path, id: &str, age_minutes: i64) {
    let file = SessionFile {
        session_id: id.to_string(),
        last_updated: Local::now() - chrono::Duration::minutes(age_minutes),
        values: BTreeMap::from([("k".to_string(), id.to_string())]),
    };
    fs::write(
        dir.join(format!("session-{}.json", id)),
        serde_json::to_string_pretty(&file).unwrap(),
    )
    .unwrap();
}

#[test]
fn test_set_persists_and_resumes() {
    let temp_dir = TempDir::new().unwrap();

    let mut session = FilesystemSession::create(temp_dir.path());
    session.set("greeting", "hello".to_string()).unwrap();
    assert!(session.path().exists());

    let resumed = FilesystemSession::resume_or_create(temp_dir.path());
    assert_eq!(resumed.session_id(), session.session_id());
    assert_eq!(resumed.get("greeting").unwrap().as_deref(), Some("hello"));
}

#[test]
fn test_create_writes_nothing_until_mutation() {
    let temp_dir = TempDir::new().unwrap();
    let session = FilesystemSession::create(temp_dir.path());
    assert!(!session.path().exists());
    assert!(session.get("missing").unwrap().is_none());
}

#[test]
fn test_expired_session_is_not_resumed() {
    let temp_dir = TempDir::new().unwrap();
    write_session_file(temp_dir.path(), "expired-123", SESSION_EXPIRY_MINUTES * 2);

    let session = FilesystemSession::resume_or_create(temp_dir.path());
    assert_ne!(session.session_id(), "expired-123");
    assert!(!temp_dir.path().join("session-expired-123.json").exists());
}

#[test]
fn test_most_recent_session_wins() {
    let temp_dir = TempDir::new().unwrap();
    write_session_file(temp_dir.path(), "old", 10);
    write_session_file(temp_dir.path(), "new", 0);

    let session = FilesystemSession::resume_or_create(temp_dir.path());
    assert_eq!(session.session_id(), "new");
    assert_eq!(session.get("k").unwrap().as_deref(), Some("new"));
}

#[test]
fn test_clear_all_sessions() {
    let temp_dir = TempDir::new().unwrap();
    write_session_file(temp_dir.path(), "session-1", 0);
    write_session_file(temp_dir.path(), "session-2", 0);
    fs::write(temp_dir.path().join("notes.txt"), "keep me").unwrap();

    let removed = FilesystemSession::clear_all(temp_dir.path()).unwrap();
    assert_eq!(removed, 2);
    assert!(temp_dir.path().join("notes.txt").exists());

    let session = FilesystemSession::resume_or_create(temp_dir.path());
    assert!(session.get("k").unwrap().is_none());
}

#[test]
fn test_conversation_survives_process_restart() {
    let temp_dir = TempDir::new().unwrap();

    let mut store = ConversationStore::with_defaults(FilesystemSession::create(temp_dir.path()));
    store.append(Role::User, "remember me").unwrap();
    store.append(Role::Assistant, "noted").unwrap();
    let session_id = store.backend().session_id().to_string();
    drop(store);

    let mut store = ConversationStore::with_defaults(FilesystemSession::resume_or_create(temp_dir.path()));
    assert_eq!(store.backend().session_id(), session_id);
    let history = store.read();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].content, "remember me");

    store.clear().unwrap();
    let raw = fs::read_to_string(store.backend().path()).unwrap();
    assert!(!raw.contains("conversation_compressed"));
}

#[test]
fn test_failed_write_leaves_values_unchanged() {
    let temp_dir = TempDir::new().unwrap();
    let session_dir = temp_dir.path().join("sessions");

    let mut session = FilesystemSession::create(&session_dir);
    session.set("k", "v1".to_string()).unwrap();

    // A plain file where the session directory was makes every save fail
    fs::remove_dir_all(&session_dir).unwrap();
    fs::write(&session_dir, "not a directory").unwrap();

    assert!(session.set("k", "v2".to_string()).is_err());
    assert_eq!(session.get("k").unwrap().as_deref(), Some("v1"));

    assert!(session.set("other", "x".to_string()).is_err());
    assert!(session.get("other").unwrap().is_none());

    assert!(session.remove("k").is_err());
    assert_eq!(session.get("k").unwrap().as_deref(), Some("v1"));
}
